//! Reconciliation options, classification and plan.

use crate::model::{normalize_value, unwrap_single_value, SecretData, VALUE_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a reconciliation run behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOptions {
    /// Compute the plan without writing or deleting anything
    pub dry_run: bool,
    /// Skip keys whose live version differs from the captured version
    pub verify: bool,
    /// Delete live keys that are not in the snapshot
    pub delete_extra: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            verify: false,
            delete_extra: true,
        }
    }
}

/// Outcome for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    Added,
    Updated,
    Deleted,
    /// Live version no longer matches the snapshot (verify mode)
    Skipped,
    Unchanged,
}

impl ReconcileAction {
    /// Whether the action writes or deletes when not in dry-run
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            ReconcileAction::Added | ReconcileAction::Updated | ReconcileAction::Deleted
        )
    }
}

/// Per-action key lists of a reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationPlan {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
    pub unchanged: Vec<String>,
}

impl ReconciliationPlan {
    pub fn record(&mut self, key: impl Into<String>, action: ReconcileAction) {
        let key = key.into();
        match action {
            ReconcileAction::Added => self.added.push(key),
            ReconcileAction::Updated => self.updated.push(key),
            ReconcileAction::Deleted => self.deleted.push(key),
            ReconcileAction::Skipped => self.skipped.push(key),
            ReconcileAction::Unchanged => self.unchanged.push(key),
        }
    }

    /// Any add, update or delete
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.updated.is_empty() || !self.deleted.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.added.len() + self.updated.len() + self.deleted.len()
    }

    /// Sort every list lexicographically
    pub fn sort(&mut self) {
        self.added.sort();
        self.updated.sort();
        self.deleted.sort();
        self.skipped.sort();
        self.unchanged.sort();
    }
}

/// Whether a live payload already holds the captured value.
///
/// Both sides are reduced to their single `value` when that is their only
/// field, then compared as normalized strings.
pub fn values_match(live: &SecretData, captured: &Value) -> bool {
    let captured = match captured {
        Value::Object(map) if map.len() == 1 => map.get(VALUE_FIELD).unwrap_or(captured),
        other => other,
    };
    normalize_value(&unwrap_single_value(live)) == normalize_value(captured)
}

/// Classify a key present in the snapshot.
///
/// `live_version` is the current version of a listed key and is only
/// consulted under `verify`. It is checked before `live_data`, so a key
/// whose current version was soft-deleted after capture is still skipped.
/// `live_data` is `None` when the key has no readable current payload.
pub fn classify_entry(
    options: &ReconcileOptions,
    captured_version: u64,
    captured_value: &Value,
    live_version: Option<u64>,
    live_data: Option<&SecretData>,
) -> ReconcileAction {
    if options.verify && live_version.is_some_and(|v| v != captured_version) {
        return ReconcileAction::Skipped;
    }
    let Some(live_data) = live_data else {
        return ReconcileAction::Added;
    };
    if values_match(live_data, captured_value) {
        ReconcileAction::Unchanged
    } else {
        ReconcileAction::Updated
    }
}
