//! Diff computation engine.
//!
//! The core entry point is [`compute_diff`], which accepts two flat maps and
//! produces a [`DiffResult`]. Values are compared by SHA-256 digest of their
//! normalized string form; the raw strings are kept for display.

use crate::diff::model::{ChangedEntry, DiffEntry, DiffResult};
use crate::model::FlatMap;
use sha2::{Digest as _, Sha256};
use vaultline_core_types::Sensitive;

/// Hex-encoded SHA-256 of a normalized value (64 characters).
pub fn hash_value(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the diff between two flat maps.
///
/// Output lists are sorted by key; `BTreeMap` iteration already yields that
/// order so no post-sort is needed.
pub fn compute_diff(first: &FlatMap, second: &FlatMap) -> DiffResult {
    let mut result = DiffResult::default();

    for (key, first_value) in first {
        match second.get(key) {
            None => result.only_in_first.push(DiffEntry {
                key: key.clone(),
                value: Sensitive::new(first_value.clone()),
            }),
            Some(second_value) => {
                let first_digest = hash_value(first_value);
                let second_digest = hash_value(second_value);
                if first_digest == second_digest {
                    result.unchanged += 1;
                } else {
                    result.changed.push(ChangedEntry {
                        key: key.clone(),
                        first_len: first_value.chars().count(),
                        second_len: second_value.chars().count(),
                        first_value: Sensitive::new(first_value.clone()),
                        second_value: Sensitive::new(second_value.clone()),
                        first_digest,
                        second_digest,
                    });
                }
            }
        }
    }

    for (key, second_value) in second {
        if !first.contains_key(key) {
            result.only_in_second.push(DiffEntry {
                key: key.clone(),
                value: Sensitive::new(second_value.clone()),
            });
        }
    }

    result
}
