//! `MemoryStore`: the reference `SecretStore` backend.

use crate::errors::{KvError, Result};
use crate::memory::clock::{Clock, SystemClock};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use vaultline_core::errors::Result as ExResult;
use vaultline_core::model::{SecretData, SecretMetadata, VersionInfo};
use vaultline_core::store::SecretStore;

/// Default number of versions retained per key
pub const DEFAULT_MAX_VERSIONS: u32 = 10;

/// Engine-wide settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvConfig {
    /// Versions kept per key; older ones are pruned on write. 0 keeps all.
    pub max_versions: u32,
}

impl Default for KvConfig {
    fn default() -> Self {
        Self {
            max_versions: DEFAULT_MAX_VERSIONS,
        }
    }
}

#[derive(Debug, Clone)]
struct VersionRecord {
    info: VersionInfo,
    /// `None` once destroyed
    data: Option<SecretData>,
}

#[derive(Debug, Clone)]
struct KeyRecord {
    current_version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    versions: BTreeMap<u64, VersionRecord>,
}

impl KeyRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            current_version: 0,
            created_at: now,
            updated_at: now,
            versions: BTreeMap::new(),
        }
    }

    fn next_version(&mut self, now: DateTime<Utc>, data: SecretData) -> u64 {
        self.current_version += 1;
        self.updated_at = now;
        self.versions.insert(
            self.current_version,
            VersionRecord {
                info: VersionInfo {
                    version: self.current_version,
                    created_at: now,
                    destroyed: false,
                    deleted: false,
                },
                data: Some(data),
            },
        );
        self.current_version
    }

    /// Remove the oldest versions beyond `max_versions`; returns what was removed
    fn prune_versions(&mut self, max_versions: u32) -> Vec<u64> {
        if max_versions == 0 || self.versions.len() <= max_versions as usize {
            return vec![];
        }
        let to_remove = self.versions.len() - max_versions as usize;
        let removed: Vec<u64> = self.versions.keys().copied().take(to_remove).collect();
        for v in &removed {
            self.versions.remove(v);
        }
        removed
    }
}

/// In-memory versioned key-value store
///
/// Keys are `/`-separated paths. A path may be both a key and the prefix of
/// other keys, as in a KV-v2 engine.
#[derive(Debug)]
pub struct MemoryStore {
    config: KvConfig,
    clock: Box<dyn Clock>,
    keys: BTreeMap<String, KeyRecord>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store with default config and wall-clock timestamps
    pub fn new() -> Self {
        Self::with_config(KvConfig::default(), Box::new(SystemClock))
    }

    pub fn with_config(config: KvConfig, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            keys: BTreeMap::new(),
        }
    }

    /// Empty store with default config and the given clock
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self::with_config(KvConfig::default(), clock)
    }

    pub fn config(&self) -> KvConfig {
        self.config
    }

    pub fn set_config(&mut self, config: KvConfig) {
        self.config = config;
    }

    /// Number of keys stored
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn validate_path(path: &str) -> Result<()> {
        let invalid = |reason: &str| KvError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };
        if path.is_empty() {
            return Err(invalid("path is empty"));
        }
        if path.starts_with('/') || path.ends_with('/') {
            return Err(invalid("leading or trailing '/'"));
        }
        if path.split('/').any(str::is_empty) {
            return Err(invalid("empty segment"));
        }
        Ok(())
    }

    fn record(&self, path: &str) -> Result<&KeyRecord> {
        self.keys.get(path).ok_or_else(|| KvError::SecretNotFound {
            path: path.to_string(),
        })
    }

    fn record_mut(&mut self, path: &str) -> Result<&mut KeyRecord> {
        self.keys.get_mut(path).ok_or_else(|| KvError::SecretNotFound {
            path: path.to_string(),
        })
    }

    /// Read a version, current when `version` is `None`
    pub fn read(&self, path: &str, version: Option<u64>) -> Result<SecretData> {
        let record = self.record(path)?;
        let version = version.unwrap_or(record.current_version);
        let entry = record
            .versions
            .get(&version)
            .ok_or_else(|| KvError::VersionNotFound {
                path: path.to_string(),
                version,
            })?;
        if entry.info.destroyed {
            return Err(KvError::VersionDestroyed {
                path: path.to_string(),
                version,
            });
        }
        if entry.info.deleted {
            return Err(KvError::VersionDeleted {
                path: path.to_string(),
                version,
            });
        }
        entry.data.clone().ok_or_else(|| KvError::VersionDestroyed {
            path: path.to_string(),
            version,
        })
    }

    /// Write a new version and prune beyond `max_versions`
    pub fn put(&mut self, path: &str, data: SecretData) -> Result<u64> {
        Self::validate_path(path)?;
        let now = self.clock.now();
        let max_versions = self.config.max_versions;

        let record = self
            .keys
            .entry(path.to_string())
            .or_insert_with(|| KeyRecord::new(now));
        let version = record.next_version(now, data);
        let pruned = record.prune_versions(max_versions);

        debug!(path = %path, version = version, pruned = pruned.len(), "Wrote secret");
        Ok(version)
    }

    /// Soft-delete versions; the current version when `versions` is empty
    pub fn delete_versions(&mut self, path: &str, versions: &[u64]) -> Result<()> {
        let now = self.clock.now();
        let record = self.record_mut(path)?;
        let targets = if versions.is_empty() {
            vec![record.current_version]
        } else {
            versions.to_vec()
        };
        for version in targets {
            if let Some(entry) = record.versions.get_mut(&version) {
                if !entry.info.destroyed {
                    entry.info.deleted = true;
                    debug!(path = %path, version = version, "Soft-deleted secret version");
                }
            }
        }
        record.updated_at = now;
        Ok(())
    }

    /// Restore soft-deleted versions
    pub fn undelete_versions(&mut self, path: &str, versions: &[u64]) -> Result<()> {
        let now = self.clock.now();
        let record = self.record_mut(path)?;
        for &version in versions {
            if let Some(entry) = record.versions.get_mut(&version) {
                if entry.info.destroyed {
                    return Err(KvError::UndeleteDestroyed {
                        path: path.to_string(),
                        version,
                    });
                }
                entry.info.deleted = false;
            }
        }
        record.updated_at = now;
        Ok(())
    }

    /// Permanently drop the data of versions; their metadata stays
    pub fn destroy_versions(&mut self, path: &str, versions: &[u64]) -> Result<()> {
        let now = self.clock.now();
        let record = self.record_mut(path)?;
        for version in versions {
            if let Some(entry) = record.versions.get_mut(version) {
                entry.data = None;
                entry.info.destroyed = true;
                debug!(path = %path, version = *version, "Destroyed secret version");
            }
        }
        record.updated_at = now;
        Ok(())
    }

    /// Remove a key with its whole history. Missing keys are not an error.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        if self.keys.remove(path).is_some() {
            debug!(path = %path, "Deleted secret metadata and all versions");
        }
        Ok(())
    }

    /// Relative paths of keys strictly below `base`, sorted
    pub fn list(&self, base: &str) -> Vec<String> {
        let base = base.trim_end_matches('/');
        if base.is_empty() {
            return self.keys.keys().cloned().collect();
        }
        let prefix = format!("{}/", base);
        self.keys
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .map(|(k, _)| k[prefix.len()..].to_string())
            .collect()
    }

    /// Version history, newest first
    pub fn history(&self, path: &str) -> Result<Vec<VersionInfo>> {
        let record = self.record(path)?;
        Ok(record.versions.values().rev().map(|v| v.info.clone()).collect())
    }

    pub fn metadata(&self, path: &str) -> Result<SecretMetadata> {
        let record = self.record(path)?;
        Ok(SecretMetadata {
            current_version: record.current_version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

impl SecretStore for MemoryStore {
    fn read_current(&self, path: &str) -> ExResult<SecretData> {
        Ok(self.read(path, None)?)
    }

    fn read_version(&self, path: &str, version: u64) -> ExResult<SecretData> {
        Ok(self.read(path, Some(version))?)
    }

    fn list_version_history(&self, path: &str) -> ExResult<Vec<VersionInfo>> {
        Ok(self.history(path)?)
    }

    fn list_paths(&self, base_path: &str) -> ExResult<Vec<String>> {
        Ok(self.list(base_path))
    }

    fn read_metadata(&self, path: &str) -> ExResult<SecretMetadata> {
        Ok(self.metadata(path)?)
    }

    fn write(&mut self, path: &str, data: SecretData) -> ExResult<u64> {
        Ok(self.put(path, data)?)
    }

    fn delete(&mut self, path: &str) -> ExResult<()> {
        Ok(self.remove(path)?)
    }
}
