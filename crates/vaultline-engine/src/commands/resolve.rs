//! Versioned reads: `path@selector` to a flat state, and diffs of two such
//! references.
//!
//! ## Shape detection
//!
//! A path with at least one key below it is a directory; anything else is
//! treated as a single key. The selector is checked against the shape before
//! any version is read: `@N` needs a key, `@-N` needs a directory.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use serde::{Deserialize, Serialize};
use vaultline_core::diff::{compute_diff, DiffResult};
use vaultline_core::errors::{ExError, ExErrorKind, Result};
use vaultline_core::model::FlatMap;
use vaultline_core::store::SecretStore;
use vaultline_core::version_ref::{parse_versioned_path, VersionSelector, VersionedPath};
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::reconstruct::{key_at_selector, previous_state, state_at_changes_ago};
use crate::commands::state::{directory_state, elapsed_ms, list_keys};

/// What a base path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceShape {
    Directory,
    Key,
}

/// A resolved versioned reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedState {
    pub source: VersionedPath,
    pub shape: SourceShape,
    pub state: FlatMap,
}

/// Both sides of a versioned diff and their differences
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDiff {
    pub first: VersionedPath,
    pub second: VersionedPath,
    pub diff: DiffResult,
}

/// Decide whether `path` is a directory or a single key.
pub fn detect_shape(store: &dyn SecretStore, path: &str) -> Result<SourceShape> {
    let keys = list_keys(store, path, "detect_shape")?;
    Ok(if keys.is_empty() {
        SourceShape::Key
    } else {
        SourceShape::Directory
    })
}

/// Reject selectors that make no sense for the shape.
///
/// # Errors
///
/// `InvalidSelector` for `Exact` on a directory or `ChangesAgo` on a key.
pub fn validate_selector(source: &VersionedPath, shape: SourceShape) -> Result<()> {
    match (shape, source.selector) {
        (SourceShape::Directory, VersionSelector::Exact(_))
        | (SourceShape::Key, VersionSelector::ChangesAgo(_)) => {
            Err(selector_mismatch(source, shape))
        }
        _ => Ok(()),
    }
}

fn selector_mismatch(source: &VersionedPath, shape: SourceShape) -> ExError {
    let reason = match shape {
        SourceShape::Directory => {
            "a version number applies to a single key; use @-N for directories"
        }
        SourceShape::Key => "changes-ago applies to directories; use @N or @prev for keys",
    };
    ExError::new(ExErrorKind::InvalidSelector)
        .with_op("validate_selector")
        .with_path(source.path.as_str())
        .with_selector(source.selector.suffix())
        .with_message(reason)
}

/// Resolve an already parsed reference to its flat state.
///
/// # Errors
///
/// `InvalidSelector` on a shape mismatch, otherwise whatever the
/// underlying reconstruction reports.
pub fn resolve_source(store: &dyn SecretStore, source: &VersionedPath) -> Result<ResolvedState> {
    let shape = detect_shape(store, &source.path)?;
    let dir = source.path.as_str();

    let state = match (shape, source.selector) {
        (SourceShape::Directory, VersionSelector::Exact(_))
        | (SourceShape::Key, VersionSelector::ChangesAgo(_)) => {
            return Err(selector_mismatch(source, shape));
        }
        (SourceShape::Directory, VersionSelector::None) => directory_state(store, dir)?,
        (SourceShape::Directory, VersionSelector::Previous) => previous_state(store, dir)?,
        (SourceShape::Directory, VersionSelector::ChangesAgo(n)) => {
            state_at_changes_ago(store, dir, n)?
        }
        (SourceShape::Key, selector) => key_at_selector(store, dir, selector)?,
    };

    Ok(ResolvedState {
        source: source.clone(),
        shape,
        state,
    })
}

/// Parse `input` as `path[@selector]` and read the state it names.
pub fn read_versioned(store: &dyn SecretStore, input: &str) -> Result<ResolvedState> {
    log_op_start!("read_versioned", reference = input);
    let start = Instant::now();

    let source = parse_versioned_path(input);
    let result = resolve_source(store, &source).map_err(|e| {
        if e.selector().is_none() && !source.selector.is_none() {
            e.with_selector(source.selector.suffix())
        } else {
            e
        }
    });

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(r) => log_op_end!(
            "read_versioned",
            duration_ms = elapsed,
            shape = ?r.shape,
            fields = r.state.len()
        ),
        Err(e) => log_op_error!("read_versioned", e, duration_ms = elapsed),
    }
    result
}

/// Resolve two references and diff their states.
pub fn diff_versioned(store: &dyn SecretStore, first: &str, second: &str) -> Result<VersionedDiff> {
    log_op_start!("diff_versioned", first = first, second = second);
    let start = Instant::now();

    let result = (|| -> Result<VersionedDiff> {
        let a = read_versioned(store, first)?;
        let b = read_versioned(store, second)?;
        Ok(VersionedDiff {
            diff: compute_diff(&a.state, &b.state),
            first: a.source,
            second: b.source,
        })
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(d) => log_op_end!(
            "diff_versioned",
            duration_ms = elapsed,
            has_differences = d.diff.has_differences()
        ),
        Err(e) => log_op_error!("diff_versioned", e, duration_ms = elapsed),
    }
    result
}
