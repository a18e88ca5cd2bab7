//! Field-level changes between two versions of a single key.

use crate::diff::model::{ChangeType, VersionChange};
use crate::flatten::flatten;
use crate::model::SecretData;
use vaultline_core_types::Sensitive;

/// Compare two payloads of the same key and list what changed, sorted by
/// field.
///
/// Nested fields are compared in their flattened (dotted) form.
pub fn compare_versions(old: &SecretData, new: &SecretData) -> Vec<VersionChange> {
    let old_flat = flatten(old);
    let new_flat = flatten(new);
    let mut changes = Vec::new();

    for (key, new_value) in &new_flat {
        match old_flat.get(key) {
            None => changes.push(VersionChange {
                key: key.clone(),
                change_type: ChangeType::Added,
                old_value: None,
                new_value: Some(Sensitive::new(new_value.clone())),
                old_len: 0,
                new_len: new_value.chars().count(),
            }),
            Some(old_value) if old_value != new_value => changes.push(VersionChange {
                key: key.clone(),
                change_type: ChangeType::Modified,
                old_value: Some(Sensitive::new(old_value.clone())),
                new_value: Some(Sensitive::new(new_value.clone())),
                old_len: old_value.chars().count(),
                new_len: new_value.chars().count(),
            }),
            Some(_) => {}
        }
    }

    for (key, old_value) in &old_flat {
        if !new_flat.contains_key(key) {
            changes.push(VersionChange {
                key: key.clone(),
                change_type: ChangeType::Deleted,
                old_value: Some(Sensitive::new(old_value.clone())),
                new_value: None,
                old_len: old_value.chars().count(),
                new_len: 0,
            });
        }
    }

    changes.sort_by(|a, b| a.key.cmp(&b.key));
    changes
}
