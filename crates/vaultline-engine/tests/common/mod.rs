use std::collections::BTreeSet;

use serde_json::{json, Value};
use vaultline_core::errors::{ExError, ExErrorKind, Result};
use vaultline_core::model::{FlatMap, SecretData, SecretMetadata, VersionInfo};
use vaultline_core::store::SecretStore;
use vaultline_store::{KvConfig, MemoryStore, SteppingClock};

/// Store with a deterministic one-second clock
#[allow(dead_code)]
pub fn stepping_store() -> MemoryStore {
    MemoryStore::with_clock(Box::new(SteppingClock::default()))
}

/// Stepping-clock store keeping at most `max_versions` per key
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

/// Write a single-value secret
#[allow(dead_code)]
pub fn put(store: &mut dyn SecretStore, path: &str, value: &str) -> u64 {
    store.write(path, payload(json!({ "value": value }))).unwrap()
}

/// Build a flat map from string pairs
#[allow(dead_code)]
pub fn flat(pairs: &[(&str, &str)]) -> FlatMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// `secret/app` with keys `k1` and `k2`, each written three times,
/// interleaved: k1v1 k2v1 k1v2 k2v2 k1v3 k2v3. Four changes in total.
#[allow(dead_code)]
pub fn interleaved_store() -> MemoryStore {
    let mut store = stepping_store();
    for round in 1..=3 {
        put(&mut store, "secret/app/k1", &format!("k1-v{}", round));
        put(&mut store, "secret/app/k2", &format!("k2-v{}", round));
    }
    store
}

/// A `MemoryStore` whose calls fail for chosen paths.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_history: BTreeSet<String>,
    pub fail_reads: BTreeSet<String>,
    pub fail_writes: BTreeSet<String>,
    pub reads: std::cell::Cell<usize>,
}

#[allow(dead_code)]
impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    fn injected(path: &str) -> ExError {
        ExError::new(ExErrorKind::Internal)
            .with_path(path)
            .with_message("injected failure")
    }

    fn check(set: &BTreeSet<String>, path: &str) -> Result<()> {
        if set.contains(path) {
            Err(Self::injected(path))
        } else {
            Ok(())
        }
    }

    fn count_read(&self) {
        self.reads.set(self.reads.get() + 1);
    }
}

impl SecretStore for FlakyStore {
    fn read_current(&self, path: &str) -> Result<SecretData> {
        self.count_read();
        Self::check(&self.fail_reads, path)?;
        self.inner.read_current(path)
    }

    fn read_version(&self, path: &str, version: u64) -> Result<SecretData> {
        self.count_read();
        Self::check(&self.fail_reads, path)?;
        self.inner.read_version(path, version)
    }

    fn list_version_history(&self, path: &str) -> Result<Vec<VersionInfo>> {
        Self::check(&self.fail_history, path)?;
        self.inner.list_version_history(path)
    }

    fn list_paths(&self, base_path: &str) -> Result<Vec<String>> {
        self.inner.list_paths(base_path)
    }

    fn read_metadata(&self, path: &str) -> Result<SecretMetadata> {
        self.inner.read_metadata(path)
    }

    fn write(&mut self, path: &str, data: SecretData) -> Result<u64> {
        Self::check(&self.fail_writes, path)?;
        self.inner.write(path, data)
    }

    fn delete(&mut self, path: &str) -> Result<()> {
        Self::check(&self.fail_writes, path)?;
        self.inner.delete(path)
    }
}
