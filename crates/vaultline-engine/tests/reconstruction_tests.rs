//! Point-in-time reconstruction of directories and keys.
//!
//! Most tests use the interleaved fixture: k1v1 k2v1 k1v2 k2v2 k1v3 k2v3,
//! one second apart, which records four changes.

mod common;

use common::{bounded_store, flat, interleaved_store, put, stepping_store, FlakyStore};
use vaultline_core::errors::ExErrorKind;
use vaultline_core::SecretStore;
use vaultline_core::version_ref::VersionSelector;
use vaultline_engine::commands::reconstruct::{
    key_at_selector, previous_state, state_at_changes_ago,
};
use vaultline_engine::commands::state::{directory_state, key_state};
use vaultline_engine::commands::timeline::build_timeline;

// ---------------------------------------------------------------------------
// Changes ago
// ---------------------------------------------------------------------------

#[test]
fn test_zero_changes_ago_is_live_state() {
    let store = interleaved_store();
    let live = directory_state(&store, "secret/app").unwrap();
    assert_eq!(live, flat(&[("k1", "k1-v3"), ("k2", "k2-v3")]));
    assert_eq!(state_at_changes_ago(&store, "secret/app", 0).unwrap(), live);
}

#[test]
fn test_one_change_ago_undoes_only_latest_write() {
    let store = interleaved_store();
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 1).unwrap(),
        flat(&[("k1", "k1-v3"), ("k2", "k2-v2")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 2).unwrap(),
        flat(&[("k1", "k1-v2"), ("k2", "k2-v2")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 3).unwrap(),
        flat(&[("k1", "k1-v2"), ("k2", "k2-v1")])
    );
}

#[test]
fn test_all_changes_ago_reaches_first_versions() {
    let store = interleaved_store();
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 4).unwrap(),
        flat(&[("k1", "k1-v1"), ("k2", "k2-v1")])
    );
}

#[test]
fn test_one_past_total_is_invalid_depth() {
    let store = interleaved_store();
    let err = state_at_changes_ago(&store, "secret/app", 5).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidDepth);
    assert_eq!(err.selector(), Some("@-5"));
    assert_eq!(err.path(), Some("secret/app"));
}

#[test]
fn test_changes_ago_without_updates_is_no_history() {
    let mut store = stepping_store();
    put(&mut store, "secret/app/a", "1");
    put(&mut store, "secret/app/b", "2");
    let err = state_at_changes_ago(&store, "secret/app", 1).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoHistory);
}

#[test]
fn test_changes_ago_on_empty_directory_is_not_found() {
    let store = stepping_store();
    for n in [0, 1] {
        let err = state_at_changes_ago(&store, "secret/none", n).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}

#[test]
fn test_key_created_later_is_kept_at_v1() {
    let mut store = stepping_store();
    put(&mut store, "secret/app/a", "a1");
    put(&mut store, "secret/app/a", "a2");
    put(&mut store, "secret/app/b", "b1");

    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 1).unwrap(),
        flat(&[("a", "a1"), ("b", "b1")])
    );
}

#[test]
fn test_soft_deleted_versions_are_not_changes() {
    let mut store = interleaved_store();
    store.delete_versions("secret/app/k1", &[3]).unwrap();

    // k1 has no live value, and its v3 is no longer on the timeline
    assert_eq!(
        directory_state(&store, "secret/app").unwrap(),
        flat(&[("k2", "k2-v3")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 1).unwrap(),
        flat(&[("k1", "k1-v2"), ("k2", "k2-v2")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 4).unwrap_err().kind(),
        ExErrorKind::InvalidDepth
    );
}

#[test]
fn test_all_changes_ago_with_pruned_history() {
    let mut store = bounded_store(10);
    for i in 1..=12 {
        put(&mut store, "secret/app/k", &format!("k-v{}", i));
    }
    put(&mut store, "secret/app/other", "o-v1");

    // v1 and v2 of k are pruned; v3..=v12 are the retained changes
    let timeline = build_timeline(&store, "secret/app").unwrap();
    assert_eq!(timeline.change_count(), 10);

    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 10).unwrap(),
        flat(&[("k", "k-v3"), ("other", "o-v1")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 9).unwrap(),
        flat(&[("k", "k-v3"), ("other", "o-v1")])
    );
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 11).unwrap_err().kind(),
        ExErrorKind::InvalidDepth
    );
}

#[test]
fn test_changes_ago_steps_over_destroyed_versions() {
    let mut store = stepping_store();
    for i in 1..=4 {
        put(&mut store, "secret/app/k", &format!("k-v{}", i));
    }
    store.destroy_versions("secret/app/k", &[3]).unwrap();
    store.delete_versions("secret/app/k", &[2]).unwrap();

    // Retained: v1 and v4, so one change
    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 1).unwrap(),
        flat(&[("k", "k-v1")])
    );
}

#[test]
fn test_structured_fields_are_prefixed_by_key() {
    let mut store = stepping_store();
    store
        .write(
            "secret/app/db",
            common::payload(serde_json::json!({"user": "admin", "password": "one"})),
        )
        .unwrap();
    store
        .write(
            "secret/app/db",
            common::payload(serde_json::json!({"user": "admin", "password": "two"})),
        )
        .unwrap();

    assert_eq!(
        state_at_changes_ago(&store, "secret/app", 1).unwrap(),
        flat(&[("db.password", "one"), ("db.user", "admin")])
    );
}

#[test]
fn test_reconstruction_aborts_on_read_failure() {
    let mut flaky = FlakyStore::new(interleaved_store());
    flaky.fail_reads.insert("secret/app/k2".to_string());

    let err = state_at_changes_ago(&flaky, "secret/app", 1).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Store);
    assert_eq!(err.key(), Some("k2"));
    assert_eq!(err.version(), Some(2));
    assert_eq!(err.op(), Some("state_at_changes_ago"));
}

#[test]
fn test_reconstruction_aborts_on_history_failure() {
    let mut flaky = FlakyStore::new(interleaved_store());
    flaky.fail_history.insert("secret/app/k1".to_string());

    let err = state_at_changes_ago(&flaky, "secret/app", 1).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Store);
    assert_eq!(err.key(), Some("k1"));
}

// ---------------------------------------------------------------------------
// Previous
// ---------------------------------------------------------------------------

#[test]
fn test_previous_state_reads_each_key_one_back() {
    let store = interleaved_store();
    assert_eq!(
        previous_state(&store, "secret/app").unwrap(),
        flat(&[("k1", "k1-v2"), ("k2", "k2-v2")])
    );
}

#[test]
fn test_previous_state_skips_keys_at_v1() {
    let mut store = stepping_store();
    put(&mut store, "secret/app/a", "a1");
    put(&mut store, "secret/app/a", "a2");
    put(&mut store, "secret/app/b", "b1");

    assert_eq!(
        previous_state(&store, "secret/app").unwrap(),
        flat(&[("a", "a1")])
    );
}

#[test]
fn test_previous_state_all_at_v1_is_no_history() {
    let mut store = stepping_store();
    put(&mut store, "secret/app/a", "a1");
    let err = previous_state(&store, "secret/app").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoHistory);
    assert_eq!(err.selector(), Some("@prev"));
}

// ---------------------------------------------------------------------------
// Single keys
// ---------------------------------------------------------------------------

#[test]
fn test_key_selectors() {
    let store = interleaved_store();
    let path = "secret/app/k1";

    assert_eq!(key_state(&store, path).unwrap(), flat(&[("value", "k1-v3")]));
    assert_eq!(
        key_at_selector(&store, path, VersionSelector::None).unwrap(),
        flat(&[("value", "k1-v3")])
    );
    assert_eq!(
        key_at_selector(&store, path, VersionSelector::Exact(1)).unwrap(),
        flat(&[("value", "k1-v1")])
    );
    assert_eq!(
        key_at_selector(&store, path, VersionSelector::Previous).unwrap(),
        flat(&[("value", "k1-v2")])
    );
}

#[test]
fn test_key_previous_at_v1_is_no_history() {
    let mut store = stepping_store();
    put(&mut store, "secret/app/a", "a1");
    let err = key_at_selector(&store, "secret/app/a", VersionSelector::Previous).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NoHistory);
    assert_eq!(err.version(), Some(1));
}

#[test]
fn test_key_missing_version_is_not_found() {
    let store = interleaved_store();
    let err = key_at_selector(&store, "secret/app/k1", VersionSelector::Exact(9)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.version(), Some(9));
    assert_eq!(err.op(), Some("key_at_selector"));
}

#[test]
fn test_key_changes_ago_is_invalid_selector() {
    let store = interleaved_store();
    let err =
        key_at_selector(&store, "secret/app/k1", VersionSelector::ChangesAgo(1)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSelector);
}
