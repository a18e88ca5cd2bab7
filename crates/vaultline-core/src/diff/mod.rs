//! Flat-map diff engine.
//!
//! Compares two flattened secret states and produces a structured,
//! deterministic diff suitable for display and for downstream automation.
//!
//! ## Entry point
//!
//! ```
//! use vaultline_core::diff::{compute_diff, render_human_summary, DiffLabels, SummaryOptions};
//! use vaultline_core::model::FlatMap;
//!
//! let mut a = FlatMap::new();
//! a.insert("db.password".to_string(), "old".to_string());
//! let mut b = FlatMap::new();
//! b.insert("db.password".to_string(), "new".to_string());
//!
//! let diff = compute_diff(&a, &b);
//! assert!(diff.has_differences());
//! let text = render_human_summary(&diff, &DiffLabels::new("a", "b"), &SummaryOptions::default());
//! assert!(text.contains("db.password"));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce identical, key-sorted output.
//! - **Symmetry**: `compute_diff(a, b).only_in_first == compute_diff(b, a).only_in_second`.
//! - **Redaction**: values are held in `Sensitive` and never appear in `Debug` output.

pub mod engine;
pub mod human_summary;
pub mod model;
pub mod version_changes;

pub use engine::{compute_diff, hash_value};
pub use human_summary::{
    format_version_change, render_human_summary, render_plan_summary, truncate_value, DiffLabels,
    SummaryMode, SummaryOptions, DEFAULT_DISPLAY_LIMIT,
};
pub use model::{ChangeType, ChangedEntry, DiffEntry, DiffResult, VersionChange};
pub use version_changes::compare_versions;
