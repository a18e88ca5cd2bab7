//! The secret store seam.
//!
//! The engine never talks to a backend directly; it only sees this trait.
//! Implementations own every consistency guarantee for individual key reads
//! and writes. Paths are `/`-separated; a directory is any prefix with keys
//! beneath it.

use crate::errors::Result;
use crate::model::{SecretData, SecretMetadata, VersionInfo};

/// Per-key read/write/version-history primitives of a versioned KV store
///
/// Every method reports a missing key or version as an `ExError` of kind
/// `NotFound`; any other failure should use kind `Store`.
pub trait SecretStore {
    /// Read the current version of a key
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not exist or its current version is deleted.
    fn read_current(&self, path: &str) -> Result<SecretData>;

    /// Read one specific version of a key
    ///
    /// # Errors
    ///
    /// `NotFound` if the key or the version is absent, deleted or destroyed.
    fn read_version(&self, path: &str, version: u64) -> Result<SecretData>;

    /// Version history of a key, newest first, including deleted and
    /// destroyed versions (flagged)
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not exist.
    fn list_version_history(&self, path: &str) -> Result<Vec<VersionInfo>>;

    /// Relative paths of every key below `base_path`, recursively, sorted
    ///
    /// A base path with nothing beneath it yields an empty list.
    fn list_paths(&self, base_path: &str) -> Result<Vec<String>>;

    /// Key-level metadata
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not exist.
    fn read_metadata(&self, path: &str) -> Result<SecretMetadata>;

    /// Current version number of a key
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not exist.
    fn current_version(&self, path: &str) -> Result<u64> {
        Ok(self.read_metadata(path)?.current_version)
    }

    /// Write a new version and return its number
    fn write(&mut self, path: &str, data: SecretData) -> Result<u64>;

    /// Remove a key with all of its versions and metadata
    fn delete(&mut self, path: &str) -> Result<()>;
}

/// Join a directory and a relative key path.
pub fn join_path(base: &str, relative: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.is_empty() {
        relative.to_string()
    } else if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("secret/app", "db"), "secret/app/db");
        assert_eq!(join_path("secret/app/", "db/creds"), "secret/app/db/creds");
        assert_eq!(join_path("", "db"), "db");
        assert_eq!(join_path("secret/app", ""), "secret/app");
    }
}
