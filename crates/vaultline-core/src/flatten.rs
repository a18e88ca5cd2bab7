//! Flattening of nested secret payloads into dotted keys.
//!
//! `{"db": {"user": "app", "port": 5432}}` becomes
//! `{"db.port": "5432", "db.user": "app"}`. Arrays are leaves.

use crate::model::{normalize_value, FlatMap, SecretData, VALUE_FIELD};
use serde_json::Value;

const VALUE_SUFFIX: &str = ".value";

/// Flatten a payload; leaf values are string-normalized.
pub fn flatten(data: &SecretData) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into(data, "", &mut out);
    out
}

fn flatten_into(data: &SecretData, prefix: &str, out: &mut FlatMap) {
    for (key, value) in data {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            Value::Object(nested) => flatten_into(nested, &full_key, out),
            leaf => {
                out.insert(full_key, normalize_value(leaf));
            }
        }
    }
}

/// Flatten and collapse `value` wrappers.
///
/// A trailing `.value` segment is stripped. With `for_directory`, a
/// top-level `value` field maps to the empty key so the caller can replace
/// it with the key's own relative path (see [`prefix_flattened`]).
pub fn flatten_and_extract_values(data: &SecretData, for_directory: bool) -> FlatMap {
    flatten(data)
        .into_iter()
        .map(|(key, value)| {
            let key = if for_directory && key == VALUE_FIELD {
                String::new()
            } else if let Some(stripped) = key.strip_suffix(VALUE_SUFFIX) {
                stripped.to_string()
            } else {
                key
            };
            (key, value)
        })
        .collect()
}

/// Move the fields of one key under its relative path inside a directory view.
///
/// `rel.field` for ordinary fields, plain `rel` for the empty key.
pub fn prefix_flattened(relative_path: &str, fields: FlatMap, out: &mut FlatMap) {
    for (key, value) in fields {
        let full_key = if key.is_empty() {
            relative_path.to_string()
        } else {
            format!("{}.{}", relative_path, key)
        };
        out.insert(full_key, value);
    }
}

/// Directory view of one key's payload.
pub fn flatten_for_directory(relative_path: &str, data: &SecretData, out: &mut FlatMap) {
    prefix_flattened(
        relative_path,
        flatten_and_extract_values(data, true),
        out,
    );
}
