use serde_json::Value;
use vaultline_core::model::SecretData;
use vaultline_store::{KvConfig, MemoryStore, SteppingClock};

/// Store with a deterministic one-second clock
#[allow(dead_code)]
pub fn stepping_store() -> MemoryStore {
    MemoryStore::with_clock(Box::new(SteppingClock::default()))
}

/// Store keeping at most `max_versions` versions per key
#[allow(dead_code)]
pub fn bounded_store(max_versions: u32) -> MemoryStore {
    MemoryStore::with_config(
        KvConfig { max_versions },
        Box::new(SteppingClock::default()),
    )
}

/// Unwrap a `json!` object literal into a payload
#[allow(dead_code)]
pub fn payload(value: Value) -> SecretData {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
