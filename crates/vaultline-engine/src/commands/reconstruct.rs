//! Point-in-time reconstruction of directories and single keys.
//!
//! Reconstruction is strict: any failed store read aborts the operation,
//! since a partial past state would be silently wrong.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::time::Instant;

use vaultline_core::errors::{annotate_store_error, ExError, ExErrorKind, Result};
use vaultline_core::flatten::{flatten_and_extract_values, flatten_for_directory};
use vaultline_core::model::FlatMap;
use vaultline_core::store::{join_path, SecretStore};
use vaultline_core::timeline::{initial_pointer, rewind_pointers};
use vaultline_core::version_ref::VersionSelector;
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::state::{elapsed_ms, read_at, read_directory, require_keys};
use crate::commands::timeline::scan_histories;

// ---------------------------------------------------------------------------
// Directory reconstruction
// ---------------------------------------------------------------------------

/// Each key's version just before its current one.
///
/// Keys still at version 1 are skipped.
///
/// # Errors
///
/// - `NotFound` if the directory has no keys
/// - `NoHistory` if every key is at version 1
pub fn previous_state(store: &dyn SecretStore, dir: &str) -> Result<FlatMap> {
    log_op_start!("previous_state", path = dir);
    let start = Instant::now();

    let result = (|| -> Result<FlatMap> {
        let op = "previous_state";
        let keys = require_keys(store, dir, op)?;
        let mut state = FlatMap::new();
        let mut included = 0usize;

        for key in &keys {
            let path = join_path(dir, key);
            let current = store
                .current_version(&path)
                .map_err(|e| annotate_store_error(e, op, &path, None).with_key(key.as_str()))?;
            if current <= 1 {
                continue;
            }
            let data = read_at(store, &path, key, current - 1, op)?;
            flatten_for_directory(key, &data, &mut state);
            included += 1;
        }

        if included == 0 {
            return Err(ExError::new(ExErrorKind::NoHistory)
                .with_op(op)
                .with_path(dir)
                .with_selector(VersionSelector::Previous.suffix())
                .with_message("every key is at version 1"));
        }
        Ok(state)
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(state) => log_op_end!("previous_state", duration_ms = elapsed, fields = state.len()),
        Err(e) => log_op_error!("previous_state", e, duration_ms = elapsed),
    }
    result
}

/// Directory state as it was `n` changes ago.
///
/// Changes are the writes that produced a version above 1, counted across
/// all keys of the directory, newest first. `n == 0` is the live state.
///
/// # Errors
///
/// - `NotFound` if the directory has no keys
/// - `NoHistory` if `n > 0` and no key was ever updated
/// - `InvalidDepth` if `n` exceeds the number of changes
pub fn state_at_changes_ago(store: &dyn SecretStore, dir: &str, n: u64) -> Result<FlatMap> {
    log_op_start!("state_at_changes_ago", path = dir, depth = n);
    let start = Instant::now();

    let result = (|| -> Result<FlatMap> {
        let op = "state_at_changes_ago";
        if n == 0 {
            return read_directory(store, dir, op);
        }

        let scan = scan_histories(store, dir, op)?;
        let events = scan.merged_events(dir);
        let histories = scan.into_strict()?;

        let pointers: BTreeMap<String, u64> = histories
            .iter()
            .map(|(key, history)| (key.clone(), initial_pointer(history)))
            .collect();
        let pointers = rewind_pointers(pointers, &events, n).map_err(|e| e.with_path(dir))?;

        let mut state = FlatMap::new();
        for (key, version) in &pointers {
            if *version == 0 {
                continue;
            }
            let path = join_path(dir, key);
            let data = read_at(store, &path, key, *version, op)?;
            flatten_for_directory(key, &data, &mut state);
        }
        Ok(state)
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(state) => {
            log_op_end!("state_at_changes_ago", duration_ms = elapsed, fields = state.len())
        }
        Err(e) => log_op_error!("state_at_changes_ago", e, duration_ms = elapsed),
    }
    result
}

// ---------------------------------------------------------------------------
// Single-key reconstruction
// ---------------------------------------------------------------------------

/// Fields of one key at the version the selector names.
///
/// # Errors
///
/// - `InvalidSelector` for `ChangesAgo`, which only applies to directories
/// - `NoHistory` for `Previous` on a key at version 1
/// - `NotFound` if the key or version does not exist
pub fn key_at_selector(
    store: &dyn SecretStore,
    path: &str,
    selector: VersionSelector,
) -> Result<FlatMap> {
    log_op_start!("key_at_selector", path = path, selector = %selector);
    let start = Instant::now();

    let result = (|| -> Result<FlatMap> {
        let op = "key_at_selector";
        let data = match selector {
            VersionSelector::None => store
                .read_current(path)
                .map_err(|e| annotate_store_error(e, op, path, None))?,
            VersionSelector::Exact(version) => store
                .read_version(path, version)
                .map_err(|e| annotate_store_error(e, op, path, Some(version)))?,
            VersionSelector::Previous => {
                let current = store
                    .current_version(path)
                    .map_err(|e| annotate_store_error(e, op, path, None))?;
                if current <= 1 {
                    return Err(ExError::new(ExErrorKind::NoHistory)
                        .with_op(op)
                        .with_path(path)
                        .with_version(current)
                        .with_selector(selector.suffix())
                        .with_message("key has no version before its first"));
                }
                store
                    .read_version(path, current - 1)
                    .map_err(|e| annotate_store_error(e, op, path, Some(current - 1)))?
            }
            VersionSelector::ChangesAgo(_) => {
                return Err(ExError::new(ExErrorKind::InvalidSelector)
                    .with_op(op)
                    .with_path(path)
                    .with_selector(selector.suffix())
                    .with_message("changes-ago applies to directories, not single keys"));
            }
        };
        Ok(flatten_and_extract_values(&data, false))
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(state) => log_op_end!("key_at_selector", duration_ms = elapsed, fields = state.len()),
        Err(e) => log_op_error!("key_at_selector", e, duration_ms = elapsed),
    }
    result
}
