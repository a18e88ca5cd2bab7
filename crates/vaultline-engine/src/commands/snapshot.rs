//! Snapshot capture and reconciliation.
//!
//! ## Reconciliation pipeline (in order):
//! 1. List live keys under the target (a missing target is empty)
//! 2. Classify every snapshot key: verify check, added, updated, unchanged
//! 3. Write added/updated values unless dry-run
//! 4. Classify live keys absent from the snapshot as deleted when
//!    `delete_extra`, deleting them unless dry-run
//! 5. Sort the plan
//!
//! Writes are applied key by key. A failed write aborts the run; keys
//! already written stay written, and a rerun converges.

#![allow(clippy::result_large_err)]

use std::collections::BTreeSet;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info};
use vaultline_core::errors::{annotate_store_error, ExErrorKind, Result};
use vaultline_core::model::wrap_for_write;
use vaultline_core::snapshot::{
    classify_entry, ReconcileAction, ReconcileOptions, ReconciliationPlan, Snapshot, SnapshotEntry,
};
use vaultline_core::store::{join_path, SecretStore};
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::state::{elapsed_ms, list_keys, read_live, require_keys};

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

/// Copy the current value and metadata of every key under `dir`.
///
/// Keys whose current version is deleted are not captured.
///
/// # Errors
///
/// `NotFound` if the directory has no keys, `Store` on a failed read.
pub fn capture_snapshot(store: &dyn SecretStore, dir: &str) -> Result<Snapshot> {
    log_op_start!("capture_snapshot", path = dir);
    let start = Instant::now();

    let result = (|| -> Result<Snapshot> {
        let op = "capture_snapshot";
        let keys = require_keys(store, dir, op)?;
        let mut snapshot = Snapshot::new(dir, Utc::now());

        for key in keys {
            let path = join_path(dir, &key);
            let Some(data) = read_live(store, &path, &key, op)? else {
                continue;
            };
            let metadata = store
                .read_metadata(&path)
                .map_err(|e| annotate_store_error(e, op, &path, None).with_key(key.as_str()))?;
            snapshot.insert(key, SnapshotEntry::from_current(&data, &metadata));
        }
        Ok(snapshot)
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(s) => log_op_end!("capture_snapshot", duration_ms = elapsed, keys = s.len()),
        Err(e) => log_op_error!("capture_snapshot", e, duration_ms = elapsed),
    }
    result
}

// ---------------------------------------------------------------------------
// Reconcile
// ---------------------------------------------------------------------------

/// Make the keys under `target` match `snapshot`.
///
/// With `dry_run` the plan is computed and nothing is written. With
/// `verify`, a key whose live version moved since capture is skipped.
///
/// # Errors
///
/// `Store` if a read, write or delete fails.
pub fn reconcile_snapshot(
    store: &mut dyn SecretStore,
    snapshot: &Snapshot,
    target: &str,
    options: ReconcileOptions,
) -> Result<ReconciliationPlan> {
    log_op_start!(
        "reconcile_snapshot",
        path = target,
        dry_run = options.dry_run,
        verify = options.verify,
        delete_extra = options.delete_extra
    );
    let start = Instant::now();

    let result = reconcile(store, snapshot, target, &options);

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(plan) => log_op_end!(
            "reconcile_snapshot",
            duration_ms = elapsed,
            added = plan.added.len(),
            updated = plan.updated.len(),
            deleted = plan.deleted.len(),
            skipped = plan.skipped.len(),
            unchanged = plan.unchanged.len()
        ),
        Err(e) => log_op_error!("reconcile_snapshot", e, duration_ms = elapsed),
    }
    result
}

fn reconcile(
    store: &mut dyn SecretStore,
    snapshot: &Snapshot,
    target: &str,
    options: &ReconcileOptions,
) -> Result<ReconciliationPlan> {
    let op = "reconcile_snapshot";
    let live_keys: BTreeSet<String> = match list_keys(&*store, target, op) {
        Ok(keys) => keys.into_iter().collect(),
        Err(e) if e.kind() == ExErrorKind::NotFound => BTreeSet::new(),
        Err(e) => return Err(e),
    };

    let mut plan = ReconciliationPlan::default();

    for (key, entry) in &snapshot.entries {
        let path = join_path(target, key);
        let live_data = if live_keys.contains(key) {
            read_live(&*store, &path, key, op)?
        } else {
            None
        };
        // Under verify, every listed key is version-checked, readable or not
        let live_version = if options.verify && live_keys.contains(key) {
            Some(store.current_version(&path).map_err(|e| {
                annotate_store_error(e, op, &path, None).with_key(key.as_str())
            })?)
        } else {
            None
        };

        let action = classify_entry(
            options,
            entry.version,
            entry.value.expose(),
            live_version,
            live_data.as_ref(),
        );

        if !options.dry_run && action.mutates() {
            let version = store
                .write(&path, wrap_for_write(entry.value.expose()))
                .map_err(|e| annotate_store_error(e, op, &path, None).with_key(key.as_str()))?;
            info!(path = %path, action = ?action, version = version, "Restored key");
        } else if action == ReconcileAction::Skipped {
            info!(
                path = %path,
                captured_version = entry.version,
                live_version = ?live_version,
                "Skipping key changed since capture"
            );
        } else {
            debug!(path = %path, action = ?action, "Classified key");
        }
        plan.record(key.as_str(), action);
    }

    if options.delete_extra {
        for key in live_keys.iter().filter(|k| snapshot.get(k).is_none()) {
            let path = join_path(target, key);
            if !options.dry_run {
                store
                    .delete(&path)
                    .map_err(|e| annotate_store_error(e, op, &path, None).with_key(key.as_str()))?;
                info!(path = %path, "Deleted key absent from snapshot");
            }
            plan.record(key.as_str(), ReconcileAction::Deleted);
        }
    }

    plan.sort();
    Ok(plan)
}
