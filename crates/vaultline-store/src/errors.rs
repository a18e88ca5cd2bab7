//! Error handling for vaultline-store
//!
//! Backends report failures as `KvError`; the `SecretStore` boundary
//! converts them into the canonical `ExError`.

use thiserror::Error;
use vaultline_core::errors::{ExError, ExErrorKind};

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Failures of a versioned key-value backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KvError {
    // ===== Addressing =====
    /// No key at this path
    #[error("secret not found: {path}")]
    SecretNotFound { path: String },

    /// The version never existed or was pruned
    #[error("version {version} not found at {path}")]
    VersionNotFound { path: String, version: u64 },

    /// The version is soft-deleted
    #[error("version {version} at {path} is deleted")]
    VersionDeleted { path: String, version: u64 },

    /// The version's data was permanently destroyed
    #[error("version {version} at {path} is destroyed")]
    VersionDestroyed { path: String, version: u64 },

    // ===== Validation =====
    /// Path is empty or has empty segments
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A destroyed version cannot be brought back
    #[error("cannot undelete destroyed version {version} at {path}")]
    UndeleteDestroyed { path: String, version: u64 },
}

impl KvError {
    /// Whether this error means "no data here" rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KvError::SecretNotFound { .. }
                | KvError::VersionNotFound { .. }
                | KvError::VersionDeleted { .. }
                | KvError::VersionDestroyed { .. }
        )
    }
}

/// Conversion from KvError to ExError
impl From<KvError> for ExError {
    fn from(err: KvError) -> Self {
        let kind = if err.is_not_found() {
            ExErrorKind::NotFound
        } else {
            ExErrorKind::Store
        };
        let message = err.to_string();
        match err {
            KvError::SecretNotFound { path } | KvError::InvalidPath { path, .. } => {
                ExError::new(kind).with_path(path).with_message(message)
            }
            KvError::VersionNotFound { path, version }
            | KvError::VersionDeleted { path, version }
            | KvError::VersionDestroyed { path, version }
            | KvError::UndeleteDestroyed { path, version } => ExError::new(kind)
                .with_path(path)
                .with_version(version)
                .with_message(message),
        }
    }
}
