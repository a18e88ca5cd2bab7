//! Version history listings for a single key or a whole directory, each
//! entry carrying its field changes against the version before it.

#![allow(clippy::result_large_err)]

use std::fmt::Write as _;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vaultline_core::diff::{compare_versions, format_version_change, VersionChange};
use vaultline_core::errors::{annotate_store_error, ExError, ExErrorKind, Result};
use vaultline_core::model::SecretData;
use vaultline_core::store::SecretStore;
use vaultline_core::timeline::KeyFailure;
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::state::{elapsed_ms, read_retained};
use crate::commands::timeline::scan_histories;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One version of a key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyHistoryEntry {
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// Newest version in the history
    pub is_current: bool,
    pub deleted: bool,
    pub destroyed: bool,
    /// Changes against the next older version; empty for the first version
    /// or when either side is unreadable
    pub changes: Vec<VersionChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyHistory {
    pub path: String,
    pub entries: Vec<KeyHistoryEntry>,
    /// Versions left out by the limit
    pub remaining: usize,
}

/// One write on a directory's timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryHistoryEntry {
    /// Path relative to the directory
    pub key: String,
    pub path: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub is_creation: bool,
    /// Changes against `version - 1`; empty for creations
    pub changes: Vec<VersionChange>,
}

#[derive(Debug, Clone)]
pub struct DirectoryHistory {
    pub base_path: String,
    pub entries: Vec<DirectoryHistoryEntry>,
    /// Entries left out by the limit
    pub remaining: usize,
    pub failures: Vec<KeyFailure>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn effective_limit(limit: usize, total: usize) -> usize {
    if limit == 0 {
        total
    } else {
        limit.min(total)
    }
}

fn changes_between(old: Option<&SecretData>, new: Option<&SecretData>) -> Vec<VersionChange> {
    match (old, new) {
        (Some(old), Some(new)) => compare_versions(old, new),
        _ => Vec::new(),
    }
}

/// Newest-first versions of one key, at most `limit` of them (0 for all).
///
/// # Errors
///
/// `NotFound` if the key does not exist or has no versions.
pub fn key_history(store: &dyn SecretStore, path: &str, limit: usize) -> Result<KeyHistory> {
    log_op_start!("key_history", path = path, limit = limit);
    let start = Instant::now();

    let result = (|| -> Result<KeyHistory> {
        let op = "key_history";
        let versions = store
            .list_version_history(path)
            .map_err(|e| annotate_store_error(e, op, path, None))?;
        if versions.is_empty() {
            return Err(ExError::new(ExErrorKind::NotFound)
                .with_op(op)
                .with_path(path)
                .with_message("no versions found"));
        }

        let shown = effective_limit(limit, versions.len());
        let mut entries = Vec::with_capacity(shown);
        let mut newer = match versions.first() {
            Some(v) => read_retained(store, path, v.version, op)?,
            None => None,
        };

        for (i, info) in versions.iter().take(shown).enumerate() {
            let older = match versions.get(i + 1) {
                Some(prev) => read_retained(store, path, prev.version, op)?,
                None => None,
            };
            entries.push(KeyHistoryEntry {
                version: info.version,
                created_at: info.created_at,
                is_current: i == 0,
                deleted: info.deleted,
                destroyed: info.destroyed,
                changes: changes_between(older.as_ref(), newer.as_ref()),
            });
            newer = older;
        }

        Ok(KeyHistory {
            path: path.to_string(),
            entries,
            remaining: versions.len() - shown,
        })
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(h) => log_op_end!("key_history", duration_ms = elapsed, entries = h.entries.len()),
        Err(e) => log_op_error!("key_history", e, duration_ms = elapsed),
    }
    result
}

/// Newest-first writes across every key under `dir`, at most `limit` of
/// them (0 for all). Keys whose history cannot be read are reported in
/// `failures`.
///
/// # Errors
///
/// `NotFound` if the directory has no keys.
pub fn directory_history(
    store: &dyn SecretStore,
    dir: &str,
    limit: usize,
) -> Result<DirectoryHistory> {
    log_op_start!("directory_history", path = dir, limit = limit);
    let start = Instant::now();

    let result = (|| -> Result<DirectoryHistory> {
        let op = "directory_history";
        let scan = scan_histories(store, dir, op)?;
        let events = scan.merged_events(dir);
        let shown = effective_limit(limit, events.len());

        let mut entries = Vec::with_capacity(shown);
        for event in events.iter().take(shown) {
            let changes = if event.is_creation {
                Vec::new()
            } else {
                let old = read_retained(store, &event.path, event.version - 1, op)?;
                let new = read_retained(store, &event.path, event.version, op)?;
                changes_between(old.as_ref(), new.as_ref())
            };
            entries.push(DirectoryHistoryEntry {
                key: event.key.clone(),
                path: event.path.clone(),
                version: event.version,
                created_at: event.created_at,
                is_creation: event.is_creation,
                changes,
            });
        }

        Ok(DirectoryHistory {
            base_path: dir.to_string(),
            entries,
            remaining: events.len() - shown,
            failures: scan.failures,
        })
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(h) => log_op_end!(
            "directory_history",
            duration_ms = elapsed,
            entries = h.entries.len(),
            failures = h.failures.len()
        ),
        Err(e) => log_op_error!("directory_history", e, duration_ms = elapsed),
    }
    result
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Text listing of a key's history. With `verbose`, each version is
/// followed by its changes; `show_values` prints values truncated to
/// `display_limit`.
pub fn render_key_history(
    history: &KeyHistory,
    verbose: bool,
    show_values: bool,
    display_limit: usize,
) -> String {
    let mut out = format!("History for {}:\n\n", history.path);
    let last = history.entries.len().saturating_sub(1);

    for (i, entry) in history.entries.iter().enumerate() {
        let current = if entry.is_current { "  (current)" } else { "" };
        let _ = writeln!(
            out,
            "v{:<3}  {}{}",
            entry.version,
            entry.created_at.format(TIME_FORMAT),
            current
        );
        if !(verbose || show_values) {
            continue;
        }
        if i < last || history.remaining > 0 {
            for change in &entry.changes {
                let _ = writeln!(
                    out,
                    "      {}",
                    format_version_change(change, show_values, display_limit)
                );
            }
        } else if entry.version == 1 {
            out.push_str("      (initial version)\n");
        }
    }

    if history.remaining > 0 {
        let _ = writeln!(
            out,
            "\n... and {} more versions (use --all to see all)",
            history.remaining
        );
    }
    out
}

/// Text listing of a directory's history, one line per write.
pub fn render_directory_history(
    history: &DirectoryHistory,
    verbose: bool,
    show_values: bool,
    display_limit: usize,
) -> String {
    let mut out = format!("History for {}:\n\n", history.base_path);

    for entry in &history.entries {
        let action = if entry.is_creation {
            "v1 (created)".to_string()
        } else {
            format!("v{} → v{}", entry.version - 1, entry.version)
        };
        let _ = writeln!(
            out,
            "{}  {:<20}  {}",
            entry.created_at.format(TIME_FORMAT),
            entry.key,
            action
        );
        if verbose || show_values {
            for change in &entry.changes {
                let _ = writeln!(
                    out,
                    "{:29}{}",
                    "",
                    format_version_change(change, show_values, display_limit)
                );
            }
        }
    }

    if history.remaining > 0 {
        let _ = writeln!(
            out,
            "\n... and {} more entries (use --all to see all)",
            history.remaining
        );
    }
    out
}
