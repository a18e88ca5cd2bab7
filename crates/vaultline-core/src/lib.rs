//! Vaultline Core - pure logic of the secret diffing and reconciliation engine
//!
//! This crate holds everything that does not need a live store:
//! - Version references (`path@3`, `path@prev`, `path@-2`)
//! - Payload flattening and value normalization
//! - Three-way diffs of flat maps and field-level version changes
//! - Timeline merging and the changes-ago pointer walk
//! - Snapshot schema, digests and reconciliation plans
//! - The `SecretStore` trait that backends implement
//! - Error, logging and configuration facilities shared by all crates

pub mod config;
pub mod diff;
pub mod errors;
pub mod flatten;
pub mod logging_facility;
pub mod model;
pub mod snapshot;
pub mod store;
pub mod timeline;
pub mod version_ref;

// Referenced by the logging macros
pub use vaultline_core_types as core_types;

// Re-export commonly used types
pub use config::Settings;
pub use diff::{compute_diff, DiffResult};
pub use errors::{ExError, ExErrorKind, Result};
pub use model::{FlatMap, SecretData, SecretMetadata, VersionInfo};
pub use snapshot::{ReconcileOptions, ReconciliationPlan, Snapshot, SnapshotEntry};
pub use store::SecretStore;
pub use timeline::{KeyFailure, Timeline, TimelineEvent};
pub use version_ref::{parse_versioned_path, VersionSelector, VersionedPath};
