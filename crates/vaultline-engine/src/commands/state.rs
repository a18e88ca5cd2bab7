//! Live state reads: a directory's flattened view and a single key's fields.
//!
//! Also hosts the listing and read helpers every other command shares, so
//! store failures are annotated the same way everywhere.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use tracing::debug;
use vaultline_core::errors::{annotate_store_error, ExError, ExErrorKind, Result};
use vaultline_core::flatten::{flatten_and_extract_values, flatten_for_directory};
use vaultline_core::model::{FlatMap, SecretData};
use vaultline_core::store::{join_path, SecretStore};
use vaultline_core::{log_op_end, log_op_error, log_op_start};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Relative key paths under `dir`, annotated on failure.
pub(crate) fn list_keys(store: &dyn SecretStore, dir: &str, op: &str) -> Result<Vec<String>> {
    store
        .list_paths(dir)
        .map_err(|e| annotate_store_error(e, op, dir, None))
}

/// Like [`list_keys`] but an empty directory is `NotFound`.
pub(crate) fn require_keys(store: &dyn SecretStore, dir: &str, op: &str) -> Result<Vec<String>> {
    let keys = list_keys(store, dir, op)?;
    if keys.is_empty() {
        return Err(ExError::new(ExErrorKind::NotFound)
            .with_op(op)
            .with_path(dir)
            .with_message("no keys under directory"));
    }
    Ok(keys)
}

/// Current payload of a key, `None` when its current version is deleted or
/// destroyed.
pub(crate) fn read_live(
    store: &dyn SecretStore,
    path: &str,
    key: &str,
    op: &str,
) -> Result<Option<SecretData>> {
    match store.read_current(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ExErrorKind::NotFound => {
            debug!(path = %path, "Key has no readable current version");
            Ok(None)
        }
        Err(e) => Err(annotate_store_error(e, op, path, None).with_key(key)),
    }
}

/// A specific version of a key, annotated on failure.
pub(crate) fn read_at(
    store: &dyn SecretStore,
    path: &str,
    key: &str,
    version: u64,
    op: &str,
) -> Result<SecretData> {
    store
        .read_version(path, version)
        .map_err(|e| annotate_store_error(e, op, path, Some(version)).with_key(key))
}

/// A specific version of a key, `None` when it is deleted, destroyed or
/// pruned.
pub(crate) fn read_retained(
    store: &dyn SecretStore,
    path: &str,
    version: u64,
    op: &str,
) -> Result<Option<SecretData>> {
    match store.read_version(path, version) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ExErrorKind::NotFound => Ok(None),
        Err(e) => Err(annotate_store_error(e, op, path, Some(version))),
    }
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

// ---------------------------------------------------------------------------
// Live state
// ---------------------------------------------------------------------------

/// Flattened current state of every key under `dir`.
///
/// Fields are keyed `rel.field`; a key holding a single `value` appears
/// under its bare relative path. Keys whose current version is deleted are
/// left out.
///
/// # Errors
///
/// `NotFound` if the directory has no keys, `Store` on a failed read.
pub fn directory_state(store: &dyn SecretStore, dir: &str) -> Result<FlatMap> {
    log_op_start!("directory_state", path = dir);
    let start = Instant::now();

    let result = read_directory(store, dir, "directory_state");

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(state) => log_op_end!("directory_state", duration_ms = elapsed, fields = state.len()),
        Err(e) => log_op_error!("directory_state", e, duration_ms = elapsed),
    }
    result
}

pub(crate) fn read_directory(store: &dyn SecretStore, dir: &str, op: &str) -> Result<FlatMap> {
    let keys = require_keys(store, dir, op)?;
    let mut state = FlatMap::new();
    for key in &keys {
        let path = join_path(dir, key);
        if let Some(data) = read_live(store, &path, key, op)? {
            flatten_for_directory(key, &data, &mut state);
        }
    }
    Ok(state)
}

/// Flattened current fields of a single key, `.value` suffixes stripped.
///
/// # Errors
///
/// `NotFound` if the key does not exist.
pub fn key_state(store: &dyn SecretStore, path: &str) -> Result<FlatMap> {
    log_op_start!("key_state", path = path);
    let start = Instant::now();

    let result = store
        .read_current(path)
        .map(|data| flatten_and_extract_values(&data, false))
        .map_err(|e| annotate_store_error(e, "key_state", path, None));

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(state) => log_op_end!("key_state", duration_ms = elapsed, fields = state.len()),
        Err(e) => log_op_error!("key_state", e, duration_ms = elapsed),
    }
    result
}
