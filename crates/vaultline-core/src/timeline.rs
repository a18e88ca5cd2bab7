//! Cross-key timelines and the changes-ago pointer walk.
//!
//! Pure logic only: the engine fetches version histories from a store and
//! hands them here to be merged and rewound.
//!
//! ## Ordering
//!
//! Events are ordered by `created_at` descending. Ties keep retrieval order
//! (keys in listing order, each key's history newest first), so the output
//! is deterministic for a given store state.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::VersionInfo;
use crate::store::join_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One retained version of one key, placed on a directory's timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Path relative to the directory
    pub key: String,
    /// Full store path of the key
    pub path: String,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    /// `version == 1`
    pub is_creation: bool,
}

/// A key whose history could not be read during a tolerant scan
#[derive(Debug, Clone)]
pub struct KeyFailure {
    pub key: String,
    pub error: ExError,
}

/// Merged, newest-first event stream of a directory
#[derive(Debug, Clone)]
pub struct Timeline {
    pub base_path: String,
    pub events: Vec<TimelineEvent>,
    /// Keys skipped because their history read failed
    pub failures: Vec<KeyFailure>,
}

impl Timeline {
    /// Events that changed an existing key (`version > 1`), newest first
    pub fn changes(&self) -> impl Iterator<Item = &TimelineEvent> {
        self.events.iter().filter(|e| !e.is_creation)
    }

    pub fn change_count(&self) -> usize {
        self.changes().count()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Timeline events for every retained version of one key.
pub fn events_for_key(base_path: &str, key: &str, history: &[VersionInfo]) -> Vec<TimelineEvent> {
    let path = join_path(base_path, key);
    history
        .iter()
        .filter(|v| v.is_retained())
        .map(|v| TimelineEvent {
            key: key.to_string(),
            path: path.clone(),
            version: v.version,
            created_at: v.created_at,
            is_creation: v.is_creation(),
        })
        .collect()
}

/// Sort events newest first. `sort_by` is stable, so ties keep their input
/// order.
pub fn merge_events(mut events: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    events
}

/// Highest retained version of a key, or 0 when none is retained.
pub fn initial_pointer(history: &[VersionInfo]) -> u64 {
    history
        .iter()
        .filter(|v| v.is_retained())
        .map(|v| v.version)
        .max()
        .unwrap_or(0)
}

/// Undo the `n` most recent changes of a directory.
///
/// `pointers` holds each key's starting version; `events` is the merged
/// newest-first timeline of retained versions. For each of the first `n`
/// changes (`version > 1`), the affected key's pointer steps back only if it
/// still points at that change's version. It moves to the key's next older
/// retained version; a key whose older versions were pruned, deleted or
/// destroyed stays at its oldest retained one, so every non-zero pointer
/// names a readable version.
///
/// # Errors
///
/// - `NoHistory` if `n > 0` and the directory has no changes at all
/// - `InvalidDepth` if `n` exceeds the number of changes
pub fn rewind_pointers(
    mut pointers: BTreeMap<String, u64>,
    events: &[TimelineEvent],
    n: u64,
) -> Result<BTreeMap<String, u64>> {
    let changes: Vec<&TimelineEvent> = events.iter().filter(|e| !e.is_creation).collect();
    let total = changes.len() as u64;

    if n > 0 && total == 0 {
        return Err(ExError::new(ExErrorKind::NoHistory)
            .with_op("rewind_pointers")
            .with_selector(format!("@-{}", n))
            .with_message("no changes recorded, every key is at version 1"));
    }
    if n > total {
        return Err(ExError::new(ExErrorKind::InvalidDepth)
            .with_op("rewind_pointers")
            .with_selector(format!("@-{}", n))
            .with_message(format!(
                "only {} changes exist, cannot go back {}",
                total, n
            )));
    }

    let mut retained: BTreeMap<&str, BTreeSet<u64>> = BTreeMap::new();
    for event in events {
        retained
            .entry(event.key.as_str())
            .or_default()
            .insert(event.version);
    }

    // n <= total, and total is a usize length
    let depth = usize::try_from(n).unwrap_or(changes.len());
    for change in changes.iter().take(depth) {
        let Some(pointer) = pointers.get_mut(&change.key) else {
            continue;
        };
        if *pointer != change.version {
            continue;
        }
        let older = retained
            .get(change.key.as_str())
            .and_then(|versions| versions.range(..change.version).next_back());
        if let Some(older) = older {
            *pointer = *older;
        }
    }

    Ok(pointers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn info(version: u64, secs: i64) -> VersionInfo {
        VersionInfo {
            version,
            created_at: at(secs),
            destroyed: false,
            deleted: false,
        }
    }

    /// k1 and k2 each at v1, v2, v3; writes interleave k1, k2, k1, k2, k1, k2
    fn interleaved() -> (BTreeMap<String, u64>, Vec<TimelineEvent>) {
        let k1 = vec![info(3, 40), info(2, 20), info(1, 0)];
        let k2 = vec![info(3, 50), info(2, 30), info(1, 10)];
        let mut events = events_for_key("dir", "k1", &k1);
        events.extend(events_for_key("dir", "k2", &k2));
        let pointers = BTreeMap::from([
            ("k1".to_string(), initial_pointer(&k1)),
            ("k2".to_string(), initial_pointer(&k2)),
        ]);
        (pointers, merge_events(events))
    }

    #[test]
    fn test_merge_orders_newest_first() {
        let (_, events) = interleaved();
        let order: Vec<(&str, u64)> = events.iter().map(|e| (e.key.as_str(), e.version)).collect();
        assert_eq!(
            order,
            vec![("k2", 3), ("k1", 3), ("k2", 2), ("k1", 2), ("k2", 1), ("k1", 1)]
        );
        assert_eq!(events[0].path, "dir/k2");
        assert!(events[5].is_creation);
    }

    #[test]
    fn test_merge_ties_keep_input_order() {
        let mut events = events_for_key("d", "a", &[info(2, 5)]);
        events.extend(events_for_key("d", "b", &[info(2, 5)]));
        let merged = merge_events(events);
        assert_eq!(merged[0].key, "a");
        assert_eq!(merged[1].key, "b");
    }

    #[test]
    fn test_deleted_and_destroyed_versions_excluded() {
        let mut history = vec![info(3, 20), info(2, 10), info(1, 0)];
        history[0].deleted = true;
        history[1].destroyed = true;
        let events = events_for_key("d", "k", &history);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].version, 1);
        assert_eq!(initial_pointer(&history), 1);
    }

    #[test]
    fn test_rewind_zero_keeps_pointers() {
        let (pointers, events) = interleaved();
        let result = rewind_pointers(pointers.clone(), &events, 0).unwrap();
        assert_eq!(result, pointers);
    }

    #[test]
    fn test_rewind_one_undoes_latest_change() {
        let (pointers, events) = interleaved();
        let result = rewind_pointers(pointers, &events, 1).unwrap();
        assert_eq!(result["k1"], 3);
        assert_eq!(result["k2"], 2);
    }

    #[test]
    fn test_rewind_all_changes_reaches_v1() {
        let (pointers, events) = interleaved();
        let result = rewind_pointers(pointers, &events, 4).unwrap();
        assert_eq!(result["k1"], 1);
        assert_eq!(result["k2"], 1);
    }

    #[test]
    fn test_rewind_past_total_is_invalid_depth() {
        let (pointers, events) = interleaved();
        let err = rewind_pointers(pointers, &events, 5).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidDepth);
        assert_eq!(err.selector(), Some("@-5"));
    }

    #[test]
    fn test_rewind_without_changes_is_no_history() {
        let history = vec![info(1, 0)];
        let events = events_for_key("d", "k", &history);
        let pointers = BTreeMap::from([("k".to_string(), 1)]);
        let err = rewind_pointers(pointers, &events, 1).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NoHistory);
    }

    #[test]
    fn test_rewind_skips_pointer_mismatch() {
        // Pointer already below the event's version (e.g. latest version deleted)
        let events = events_for_key("d", "k", &[info(3, 20), info(2, 10)]);
        let pointers = BTreeMap::from([("k".to_string(), 2)]);
        let result = rewind_pointers(pointers, &merge_events(events), 1).unwrap();
        assert_eq!(result["k"], 2);
    }

    #[test]
    fn test_rewind_stops_at_oldest_retained_version() {
        // v1 and v2 pruned: three changes retained (v3 counts, it is > 1)
        let history = vec![info(5, 40), info(4, 30), info(3, 20)];
        let events = merge_events(events_for_key("d", "k", &history));
        let pointers = BTreeMap::from([("k".to_string(), initial_pointer(&history))]);
        let result = rewind_pointers(pointers, &events, 3).unwrap();
        assert_eq!(result["k"], 3);
    }

    #[test]
    fn test_rewind_steps_over_unretained_versions() {
        let mut history = vec![info(4, 30), info(3, 20), info(2, 10), info(1, 0)];
        history[1].deleted = true;
        history[2].destroyed = true;
        let events = merge_events(events_for_key("d", "k", &history));
        let pointers = BTreeMap::from([("k".to_string(), initial_pointer(&history))]);
        let result = rewind_pointers(pointers, &events, 1).unwrap();
        assert_eq!(result["k"], 1);
    }

    #[test]
    fn test_timeline_change_count() {
        let (_, events) = interleaved();
        let timeline = Timeline {
            base_path: "dir".to_string(),
            events,
            failures: Vec::new(),
        };
        assert_eq!(timeline.change_count(), 4);
        assert!(!timeline.has_failures());
    }
}
