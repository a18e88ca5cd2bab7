//! Duplicate value detection across a directory.

#![allow(clippy::result_large_err)]

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Instant;

use serde::Serialize;
use tracing::warn;
use vaultline_core::diff::hash_value;
use vaultline_core::errors::{ExError, ExErrorKind, Result};
use vaultline_core::flatten::flatten;
use vaultline_core::store::{join_path, SecretStore};
use vaultline_core::timeline::KeyFailure;
use vaultline_core::{log_op_end, log_op_error, log_op_start};

use crate::commands::state::{elapsed_ms, read_live, require_keys};

/// Fields that hold the same value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Hex SHA-256 of the shared value
    pub digest: String,
    /// `full/key/path.field`, sorted
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DuplicateReport {
    pub base_path: String,
    /// Sorted by first field
    pub groups: Vec<DuplicateGroup>,
    /// Keys that could not be read
    pub failures: Vec<KeyFailure>,
}

impl DuplicateReport {
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }
}

/// Group every field under `dir` by value digest and keep the groups with
/// more than one member.
///
/// # Errors
///
/// - `NotFound` if the directory has no keys
/// - `Store` if no key's value could be read
pub fn find_duplicates(store: &dyn SecretStore, dir: &str) -> Result<DuplicateReport> {
    log_op_start!("find_duplicates", path = dir);
    let start = Instant::now();

    let result = (|| -> Result<DuplicateReport> {
        let op = "find_duplicates";
        let keys = require_keys(store, dir, op)?;
        let mut by_digest: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let mut failures = Vec::new();
        let mut readable = 0usize;

        for key in keys {
            let path = join_path(dir, &key);
            let data = match read_live(store, &path, &key, op) {
                Ok(Some(data)) => {
                    readable += 1;
                    data
                }
                Ok(None) => {
                    readable += 1;
                    continue;
                }
                Err(error) => {
                    warn!(path = %path, code = error.code(), "Skipping unreadable key");
                    failures.push(KeyFailure { key, error });
                    continue;
                }
            };
            for (field, value) in flatten(&data) {
                by_digest
                    .entry(hash_value(&value))
                    .or_default()
                    .push(format!("{}.{}", path, field));
            }
        }

        if readable == 0 {
            if let Some(first) = failures.first() {
                return Err(ExError::new(ExErrorKind::Store)
                    .with_op(op)
                    .with_path(dir)
                    .with_message(format!("values unreadable for all {} keys", failures.len()))
                    .with_source(first.error.clone()));
            }
        }

        let mut groups: Vec<DuplicateGroup> = by_digest
            .into_iter()
            .filter(|(_, fields)| fields.len() > 1)
            .map(|(digest, mut fields)| {
                fields.sort();
                DuplicateGroup { digest, fields }
            })
            .collect();
        groups.sort_by(|a, b| a.fields.cmp(&b.fields));

        Ok(DuplicateReport {
            base_path: dir.to_string(),
            groups,
            failures,
        })
    })();

    let elapsed = elapsed_ms(start);
    match &result {
        Ok(r) => log_op_end!(
            "find_duplicates",
            duration_ms = elapsed,
            groups = r.groups.len(),
            failures = r.failures.len()
        ),
        Err(e) => log_op_error!("find_duplicates", e, duration_ms = elapsed),
    }
    result
}

/// Text listing of duplicate groups.
pub fn render_duplicates(report: &DuplicateReport) -> String {
    if !report.has_duplicates() {
        return "No duplicate values found.\n".to_string();
    }
    let mut out = String::new();
    for group in &report.groups {
        out.push_str("Duplicate values found:\n");
        for field in &group.fields {
            let _ = writeln!(out, "  {}", field);
        }
        out.push('\n');
    }
    out
}
