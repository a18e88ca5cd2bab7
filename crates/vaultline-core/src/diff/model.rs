//! Diff output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Secret values are wrapped in `Sensitive` so `Debug` output and log fields
//! stay redacted; lists are sorted by key.

use serde::{Deserialize, Serialize};
use vaultline_core_types::Sensitive;

/// The three-way diff between two flat key-value maps.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DiffResult {
    /// Keys present only in the first map
    pub only_in_first: Vec<DiffEntry>,
    /// Keys present only in the second map
    pub only_in_second: Vec<DiffEntry>,
    /// Keys present in both with different value digests
    pub changed: Vec<ChangedEntry>,
    /// Keys present in both with identical value digests
    pub unchanged: usize,
}

impl DiffResult {
    /// True iff any key was added, removed or changed
    pub fn has_differences(&self) -> bool {
        !self.only_in_first.is_empty() || !self.only_in_second.is_empty() || !self.changed.is_empty()
    }

    /// Number of distinct keys across both maps
    pub fn total_keys(&self) -> usize {
        self.only_in_first.len() + self.only_in_second.len() + self.changed.len() + self.unchanged
    }

    /// Keys of `only_in_first`, in order
    pub fn only_in_first_keys(&self) -> Vec<&str> {
        self.only_in_first.iter().map(|e| e.key.as_str()).collect()
    }

    /// Keys of `only_in_second`, in order
    pub fn only_in_second_keys(&self) -> Vec<&str> {
        self.only_in_second.iter().map(|e| e.key.as_str()).collect()
    }

    /// Keys of `changed`, in order
    pub fn changed_keys(&self) -> Vec<&str> {
        self.changed.iter().map(|e| e.key.as_str()).collect()
    }
}

/// A key that exists on one side only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffEntry {
    pub key: String,
    pub value: Sensitive<String>,
}

/// A key whose value differs between the two sides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChangedEntry {
    pub key: String,
    /// Length in characters of the first value
    pub first_len: usize,
    /// Length in characters of the second value
    pub second_len: usize,
    pub first_value: Sensitive<String>,
    pub second_value: Sensitive<String>,
    /// Hex SHA-256 of the first value
    pub first_digest: String,
    /// Hex SHA-256 of the second value
    pub second_digest: String,
}

/// How a field changed between two versions of one key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

/// One field-level change between two versions of a key.
///
/// `old_value` is `None` for `Added`, `new_value` is `None` for `Deleted`;
/// the matching length is then 0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionChange {
    pub key: String,
    pub change_type: ChangeType,
    pub old_value: Option<Sensitive<String>>,
    pub new_value: Option<Sensitive<String>>,
    pub old_len: usize,
    pub new_len: usize,
}
