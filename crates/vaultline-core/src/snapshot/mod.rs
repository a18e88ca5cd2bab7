//! Snapshot domain logic.
//!
//! ## Responsibilities
//!
//! - Define the snapshot schema and per-key entries
//! - Compute deterministic snapshot digests
//! - Classify keys and accumulate reconciliation plans
//!
//! ## Non-Responsibilities
//!
//! - Store reads and writes (handled by `vaultline-engine`)
//! - On-disk encoding (callers serialize `Snapshot` with serde)

pub mod digest;
pub mod manifest;
pub mod plan;

pub use digest::{compute_content_digest, compute_snapshot_digest};
pub use manifest::{Snapshot, SnapshotEntry};
pub use plan::{
    classify_entry, values_match, ReconcileAction, ReconcileOptions, ReconciliationPlan,
};
