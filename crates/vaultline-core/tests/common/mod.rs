use serde_json::Value;
use vaultline_core::model::{FlatMap, SecretData};

/// Build a flat map from string pairs
#[allow(dead_code)]
pub fn flat(pairs: &[(&str, &str)]) -> FlatMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Unwrap a `json!` object literal into a payload
#[allow(dead_code)]
pub fn payload(value: Value) -> SecretData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
