//! Digest computation for snapshots.
//!
//! ## Digest Types
//!
//! - **Snapshot Digest**: hash of the full snapshot (includes `captured_at`)
//! - **Content Digest**: hash of key paths and values only, so two captures
//!   of an unchanged directory agree regardless of when they were taken
//!
//! Both use canonical JSON (`BTreeMap`-ordered keys) and hex-encoded SHA-256.

use crate::errors::Result;
use crate::snapshot::manifest::Snapshot;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Compute the full snapshot digest (includes `captured_at` and versions).
///
/// ## Errors
///
/// Returns `Serialization` if JSON serialization fails.
pub fn compute_snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let canonical = serde_json::to_string(snapshot)?;
    Ok(hash_string(&canonical))
}

/// Compute the content digest (key paths and values only).
///
/// ## Errors
///
/// Returns `Serialization` if JSON serialization fails.
pub fn compute_content_digest(snapshot: &Snapshot) -> Result<String> {
    let content: BTreeMap<&str, &serde_json::Value> = snapshot
        .entries
        .iter()
        .map(|(key, entry)| (key.as_str(), entry.value.expose()))
        .collect();
    let canonical = serde_json::to_string(&content)?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::manifest::SnapshotEntry;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use vaultline_core_types::Sensitive;

    fn snapshot(captured_secs: i64, value: &str, version: u64) -> Snapshot {
        let t = Utc.timestamp_opt(1_700_000_000 + captured_secs, 0).unwrap();
        let mut s = Snapshot::new("secret/app", t);
        s.insert(
            "db",
            SnapshotEntry {
                value: Sensitive::new(json!(value)),
                version,
                updated_at: t,
            },
        );
        s
    }

    #[test]
    fn test_content_digest_ignores_capture_time_and_version() {
        let a = snapshot(0, "x", 1);
        let b = snapshot(60, "x", 5);
        assert_eq!(
            compute_content_digest(&a).unwrap(),
            compute_content_digest(&b).unwrap()
        );
        assert_ne!(
            compute_snapshot_digest(&a).unwrap(),
            compute_snapshot_digest(&b).unwrap()
        );
    }

    #[test]
    fn test_content_digest_tracks_values() {
        let a = snapshot(0, "x", 1);
        let b = snapshot(0, "y", 1);
        let da = compute_content_digest(&a).unwrap();
        assert_eq!(da.len(), 64);
        assert_ne!(da, compute_content_digest(&b).unwrap());
    }
}
