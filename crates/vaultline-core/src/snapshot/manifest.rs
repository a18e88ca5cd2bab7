//! Snapshot schema.
//!
//! A snapshot is the captured state of every key under one directory at a
//! moment in time. It is built once by a capture and read-only afterwards.
//!
//! ## Fields
//!
//! - `source_path`: directory the snapshot was captured from
//! - `captured_at`: capture timestamp (UTC)
//! - `entries`: relative key path to value, version and last update time
//!
//! Single-`value` payloads are stored as the bare scalar; anything else is
//! stored as the full JSON object.

use crate::model::{unwrap_single_value, SecretData, SecretMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vaultline_core_types::Sensitive;

/// Point-in-time copy of a directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub source_path: String,
    pub captured_at: DateTime<Utc>,
    /// Keyed by path relative to `source_path`
    pub entries: BTreeMap<String, SnapshotEntry>,
}

/// One key as captured.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotEntry {
    pub value: Sensitive<serde_json::Value>,
    /// Version that was current at capture
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

impl SnapshotEntry {
    /// Build an entry from a key's current payload and metadata.
    pub fn from_current(data: &SecretData, metadata: &SecretMetadata) -> Self {
        Self {
            value: Sensitive::new(unwrap_single_value(data)),
            version: metadata.current_version,
            updated_at: metadata.updated_at,
        }
    }
}

impl Snapshot {
    pub fn new(source_path: impl Into<String>, captured_at: DateTime<Utc>) -> Self {
        Self {
            source_path: source_path.into(),
            captured_at,
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: SnapshotEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&SnapshotEntry> {
        self.entries.get(key)
    }

    /// Relative key paths, sorted
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
