//! Secret payloads and per-key version metadata as exchanged with a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name under which a single scalar secret is stored
pub const VALUE_FIELD: &str = "value";

/// Payload of one secret version: a JSON object of fields
pub type SecretData = Map<String, Value>;

/// Flattened view of one or more secrets: dotted key to normalized string
///
/// `BTreeMap` keeps iteration (and therefore every derived output) sorted.
pub type FlatMap = BTreeMap<String, String>;

/// One entry of a key's version history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Version number, starting at 1
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// Permanently destroyed (data unrecoverable)
    pub destroyed: bool,
    /// Soft-deleted
    pub deleted: bool,
}

impl VersionInfo {
    /// A retained version is neither deleted nor destroyed
    pub fn is_retained(&self) -> bool {
        !self.destroyed && !self.deleted
    }

    /// Version 1 is the write that created the key
    pub fn is_creation(&self) -> bool {
        self.version == 1
    }
}

/// Key-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMetadata {
    pub current_version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Render a JSON value as the string used for comparison and display.
///
/// Strings are taken verbatim, scalars use their JSON text and containers
/// are serialized compactly (object keys are sorted by `serde_json::Map`).
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// The value a secret represents: the inner scalar for `{"value": x}`
/// payloads, the whole object otherwise.
pub fn unwrap_single_value(data: &SecretData) -> Value {
    match data.get(VALUE_FIELD) {
        Some(v) if data.len() == 1 => v.clone(),
        _ => Value::Object(data.clone()),
    }
}

/// Inverse of [`unwrap_single_value`]: the payload to write for a value.
pub fn wrap_for_write(value: &Value) -> SecretData {
    match value {
        Value::Object(map) => map.clone(),
        other => {
            let mut data = Map::new();
            data.insert(VALUE_FIELD.to_string(), other.clone());
            data
        }
    }
}
