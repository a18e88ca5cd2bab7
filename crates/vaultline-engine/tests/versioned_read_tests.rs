//! `path@selector` resolution against a live store, and versioned diffs.

mod common;

use common::{flat, interleaved_store, put, stepping_store, FlakyStore};
use vaultline_core::errors::ExErrorKind;
use vaultline_core::version_ref::VersionSelector;
use vaultline_engine::commands::resolve::{
    detect_shape, diff_versioned, read_versioned, SourceShape,
};

#[test]
fn test_shape_detection() {
    let store = interleaved_store();
    assert_eq!(detect_shape(&store, "secret/app").unwrap(), SourceShape::Directory);
    assert_eq!(detect_shape(&store, "secret/app/k1").unwrap(), SourceShape::Key);
    assert_eq!(detect_shape(&store, "secret/missing").unwrap(), SourceShape::Key);
}

#[test]
fn test_read_directory_selectors() {
    let store = interleaved_store();

    let live = read_versioned(&store, "secret/app").unwrap();
    assert_eq!(live.shape, SourceShape::Directory);
    assert_eq!(live.source.selector, VersionSelector::None);
    assert_eq!(live.state, flat(&[("k1", "k1-v3"), ("k2", "k2-v3")]));

    let prev = read_versioned(&store, "secret/app@prev").unwrap();
    assert_eq!(prev.state, flat(&[("k1", "k1-v2"), ("k2", "k2-v2")]));

    let back = read_versioned(&store, "secret/app@-4").unwrap();
    assert_eq!(back.source.selector, VersionSelector::ChangesAgo(4));
    assert_eq!(back.state, flat(&[("k1", "k1-v1"), ("k2", "k2-v1")]));
}

#[test]
fn test_read_key_selectors() {
    let store = interleaved_store();

    let exact = read_versioned(&store, "secret/app/k2@2").unwrap();
    assert_eq!(exact.shape, SourceShape::Key);
    assert_eq!(exact.source.path, "secret/app/k2");
    assert_eq!(exact.state, flat(&[("value", "k2-v2")]));

    let prev = read_versioned(&store, "secret/app/k2@previous").unwrap();
    assert_eq!(prev.state, flat(&[("value", "k2-v2")]));
}

#[test]
fn test_key_containing_at_sign_is_read_literally() {
    let mut store = stepping_store();
    put(&mut store, "secret/users/ops@example.com", "token");

    let resolved = read_versioned(&store, "secret/users/ops@example.com").unwrap();
    assert_eq!(resolved.source.path, "secret/users/ops@example.com");
    assert_eq!(resolved.state, flat(&[("value", "token")]));
}

#[test]
fn test_exact_version_on_directory_rejected_before_reads() {
    let mut flaky = FlakyStore::new(interleaved_store());
    flaky.fail_reads.insert("secret/app/k1".to_string());
    flaky.fail_reads.insert("secret/app/k2".to_string());

    let err = read_versioned(&flaky, "secret/app@3").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSelector);
    assert_eq!(err.selector(), Some("@3"));
    assert_eq!(err.path(), Some("secret/app"));
    assert_eq!(flaky.reads.get(), 0);
}

#[test]
fn test_changes_ago_on_key_rejected_before_reads() {
    let flaky = FlakyStore::new(interleaved_store());

    let err = read_versioned(&flaky, "secret/app/k1@-1").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSelector);
    assert_eq!(err.selector(), Some("@-1"));
    assert_eq!(flaky.reads.get(), 0);
}

#[test]
fn test_missing_key_is_not_found() {
    let store = interleaved_store();
    let err = read_versioned(&store, "secret/app/nope").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_diff_directory_against_its_past() {
    let store = interleaved_store();
    let result = diff_versioned(&store, "secret/app@-1", "secret/app").unwrap();

    assert_eq!(result.first.selector, VersionSelector::ChangesAgo(1));
    assert_eq!(result.diff.changed_keys(), vec!["k2"]);
    assert_eq!(result.diff.unchanged, 1);
    assert!(result.diff.only_in_first.is_empty());
    assert!(result.diff.only_in_second.is_empty());

    let changed = &result.diff.changed[0];
    assert_eq!(changed.first_value.expose(), "k2-v2");
    assert_eq!(changed.second_value.expose(), "k2-v3");
}

#[test]
fn test_diff_with_added_and_removed_keys() {
    let mut store = stepping_store();
    put(&mut store, "secret/staging/a", "1");
    put(&mut store, "secret/staging/b", "2");
    put(&mut store, "secret/prod/a", "1");
    put(&mut store, "secret/prod/c", "3");

    let result = diff_versioned(&store, "secret/staging", "secret/prod").unwrap();
    assert_eq!(result.diff.only_in_first_keys(), vec!["b"]);
    assert_eq!(result.diff.only_in_second_keys(), vec!["c"]);
    assert_eq!(result.diff.unchanged, 1);
}

#[test]
fn test_diff_propagates_side_errors() {
    let store = interleaved_store();
    let err = diff_versioned(&store, "secret/app@-9", "secret/app").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidDepth);
}
