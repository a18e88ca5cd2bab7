//! Property tests for the flat-map diff.

use proptest::prelude::*;
use std::collections::BTreeMap;
use vaultline_core::diff::{compute_diff, DiffEntry};
use vaultline_core::model::FlatMap;

prop_compose! {
    fn arb_flat_map()(
        entries in prop::collection::btree_map("[a-e]{1,2}(\\.[a-c])?", "[a-z0-9]{0,6}", 0..12),
    ) -> FlatMap {
        entries
    }
}

fn keys_and_values(entries: &[DiffEntry]) -> Vec<(String, String)> {
    entries
        .iter()
        .map(|e| (e.key.clone(), e.value.expose().clone()))
        .collect()
}

proptest! {
    #[test]
    fn test_diff_with_self_is_empty(a in arb_flat_map()) {
        let diff = compute_diff(&a, &a);
        prop_assert!(diff.only_in_first.is_empty());
        prop_assert!(diff.only_in_second.is_empty());
        prop_assert!(diff.changed.is_empty());
        prop_assert_eq!(diff.unchanged, a.len());
        prop_assert!(!diff.has_differences());
    }

    #[test]
    fn test_diff_is_symmetric(a in arb_flat_map(), b in arb_flat_map()) {
        let ab = compute_diff(&a, &b);
        let ba = compute_diff(&b, &a);
        prop_assert_eq!(keys_and_values(&ab.only_in_first), keys_and_values(&ba.only_in_second));
        prop_assert_eq!(keys_and_values(&ab.only_in_second), keys_and_values(&ba.only_in_first));
        prop_assert_eq!(ab.changed_keys(), ba.changed_keys());
        prop_assert_eq!(ab.unchanged, ba.unchanged);
    }

    #[test]
    fn test_diff_partitions_all_keys(a in arb_flat_map(), b in arb_flat_map()) {
        let diff = compute_diff(&a, &b);
        let mut union: BTreeMap<&String, ()> = a.keys().map(|k| (k, ())).collect();
        union.extend(b.keys().map(|k| (k, ())));
        prop_assert_eq!(diff.total_keys(), union.len());
    }

    #[test]
    fn test_diff_outputs_sorted(a in arb_flat_map(), b in arb_flat_map()) {
        let diff = compute_diff(&a, &b);
        let mut sorted = diff.only_in_first_keys();
        sorted.sort();
        prop_assert_eq!(diff.only_in_first_keys(), sorted);
        let mut sorted = diff.changed_keys();
        sorted.sort();
        prop_assert_eq!(diff.changed_keys(), sorted);
    }
}
