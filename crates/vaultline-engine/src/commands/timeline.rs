//! Directory timeline building.
//!
//! ## Tolerance
//!
//! A key whose history cannot be read is skipped and reported in
//! `Timeline::failures`; the scan carries on with the remaining keys. Only
//! when every key fails does the whole build fail.

#![allow(clippy::result_large_err)]

use std::time::Instant;

use tracing::warn;
use vaultline_core::errors::{annotate_store_error, ExError, ExErrorKind, Result};
use vaultline_core::model::VersionInfo;
use vaultline_core::store::{join_path, SecretStore};
use vaultline_core::timeline::{events_for_key, merge_events, KeyFailure, Timeline, TimelineEvent};
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::state::{elapsed_ms, require_keys};

/// Version histories of every key under a directory.
pub(crate) struct KeyHistories {
    /// Relative key path and its history (newest first), in listing order
    pub histories: Vec<(String, Vec<VersionInfo>)>,
    pub failures: Vec<KeyFailure>,
}

impl KeyHistories {
    /// All retained versions of all keys, newest first
    pub fn merged_events(&self, dir: &str) -> Vec<TimelineEvent> {
        let events = self
            .histories
            .iter()
            .flat_map(|(key, history)| events_for_key(dir, key, history))
            .collect();
        merge_events(events)
    }

    /// The first failure, for callers that cannot tolerate any
    pub fn into_strict(self) -> Result<Vec<(String, Vec<VersionInfo>)>> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure.error),
            None => Ok(self.histories),
        }
    }
}

/// Read every key's history, recording failures instead of aborting.
pub(crate) fn scan_histories(
    store: &dyn SecretStore,
    dir: &str,
    op: &str,
) -> Result<KeyHistories> {
    let keys = require_keys(store, dir, op)?;
    let mut histories = Vec::with_capacity(keys.len());
    let mut failures = Vec::new();

    for key in keys {
        let path = join_path(dir, &key);
        match store.list_version_history(&path) {
            Ok(history) => histories.push((key, history)),
            Err(e) => {
                let error = annotate_store_error(e, op, &path, None).with_key(key.as_str());
                warn!(path = %path, code = error.code(), "Skipping key with unreadable history");
                failures.push(KeyFailure { key, error });
            }
        }
    }

    if histories.is_empty() {
        if let Some(first) = failures.first() {
            return Err(ExError::new(ExErrorKind::Store)
                .with_op(op)
                .with_path(dir)
                .with_message(format!("history unreadable for all {} keys", failures.len()))
                .with_source(first.error.clone()));
        }
    }

    Ok(KeyHistories {
        histories,
        failures,
    })
}

/// Merge the version histories of every key under `dir` into one
/// newest-first event stream.
///
/// # Errors
///
/// - `NotFound` if the directory has no keys
/// - `NoHistory` if no key has a version beyond its first
/// - `Store` if no key's history could be read
pub fn build_timeline(store: &dyn SecretStore, dir: &str) -> Result<Timeline> {
    log_op_start!("build_timeline", path = dir);
    let start = Instant::now();

    let result = (|| -> Result<Timeline> {
        let scan = scan_histories(store, dir, "build_timeline")?;
        let timeline = Timeline {
            base_path: dir.to_string(),
            events: scan.merged_events(dir),
            failures: scan.failures,
        };
        if timeline.change_count() == 0 {
            return Err(ExError::new(ExErrorKind::NoHistory)
                .with_op("build_timeline")
                .with_path(dir)
                .with_message("every key is at its first version"));
        }
        Ok(timeline)
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(t) => log_op_end!(
            "build_timeline",
            duration_ms = elapsed,
            events = t.events.len(),
            failures = t.failures.len()
        ),
        Err(e) => log_op_error!("build_timeline", e, duration_ms = elapsed),
    }
    result
}
