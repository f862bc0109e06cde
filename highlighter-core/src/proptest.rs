//! Property-based tests for the interval engine.
//!
//! These tests use proptest to verify:
//! - Insert normalizes endpoint order
//! - Clean leaves no coverage inside the cleaned range
//! - Relative time never decreases over a disjoint strike cover
//! - Any insert/clean sequence is fully reverted by as many undos

#![cfg(test)]

use proptest::prelude::*;

use crate::action::ActionExecutor;
use crate::actions::{CleanIntervalsAction, InsertIntervalAction};
use crate::interval::{Interval, IntervalKind, TimelineId};
use crate::relative_time::{merge_intervals, to_relative};
use crate::store::IntervalStore;

// =============================================================================
// Arbitrary Generators
// =============================================================================

/// Times on a quarter-second grid, so all arithmetic stays exact
fn arb_time() -> impl Strategy<Value = f64> {
    (0i32..400).prop_map(|q| q as f64 * 0.25)
}

fn arb_kind() -> impl Strategy<Value = IntervalKind> {
    prop_oneof![Just(IntervalKind::Highlight), Just(IntervalKind::Strikethrough)]
}

prop_compose! {
    fn arb_span()(a in arb_time(), len in 1i32..80) -> (f64, f64) {
        (a, a + len as f64 * 0.25)
    }
}

prop_compose! {
    fn arb_store()(
        spans in prop::collection::vec((arb_kind(), arb_span()), 0..12),
    ) -> IntervalStore {
        let timeline_id = TimelineId::new();
        let intervals = spans
            .into_iter()
            .map(|(kind, (start, end))| Interval::new(timeline_id, kind, start, end))
            .collect();
        IntervalStore::with_intervals(timeline_id, intervals).unwrap()
    }
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(IntervalKind, f64, f64),
    Clean(IntervalKind, f64, f64),
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (arb_kind(), arb_time(), arb_time()).prop_map(|(k, a, b)| Edit::Insert(k, a, b)),
        (arb_kind(), arb_time(), arb_time()).prop_map(|(k, a, b)| Edit::Clean(k, a, b)),
    ]
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn insert_normalizes_endpoints(kind in arb_kind(), (a, b) in arb_span()) {
        let mut store = IntervalStore::new(TimelineId::new());
        let forward = store.insert(kind, a, b).unwrap();
        let reverse = store.insert(kind, b, a).unwrap();

        let (f, r) = (store.get(&forward).unwrap(), store.get(&reverse).unwrap());
        prop_assert_eq!((f.start_time, f.end_time), (r.start_time, r.end_time));
        prop_assert_eq!((f.start_time, f.end_time), (a, b));
    }

    #[test]
    fn clean_leaves_nothing_inside_range(
        mut store in arb_store(),
        kind in arb_kind(),
        (start, end) in arb_span(),
    ) {
        let other_kind_before: Vec<_> = store
            .snapshot()
            .into_iter()
            .filter(|i| i.kind != kind)
            .collect();

        store.clean(kind, start, end).unwrap();

        prop_assert!(store.intervals_intersecting(kind, start, end).is_empty());
        for interval in store.iter() {
            prop_assert!(interval.start_time < interval.end_time);
        }
        let other_kind_after: Vec<_> = store
            .snapshot()
            .into_iter()
            .filter(|i| i.kind != kind)
            .collect();
        prop_assert_eq!(other_kind_before, other_kind_after);
    }

    #[test]
    fn relative_time_is_monotonic(
        spans in prop::collection::vec(arb_span(), 0..10),
        t1 in arb_time(),
        t2 in arb_time(),
    ) {
        let strikes = merge_intervals(&spans);
        let (lo, hi) = (t1.min(t2), t1.max(t2));
        prop_assert!(to_relative(lo, &strikes) <= to_relative(hi, &strikes));
    }

    #[test]
    fn undo_reverts_any_edit_sequence(
        store in arb_store(),
        edits in prop::collection::vec(arb_edit(), 1..12),
    ) {
        let before = store.clone();
        let mut executor = ActionExecutor::new(store);
        executor.set_max_undo_depth(None);

        for edit in &edits {
            // Empty ranges are rejected without recording anything
            let _ = match *edit {
                Edit::Insert(kind, a, b) => executor.execute(Box::new(InsertIntervalAction::new(kind, a, b))),
                Edit::Clean(kind, a, b) => executor.execute(Box::new(CleanIntervalsAction::new(kind, a, b))),
            };
        }
        for _ in 0..edits.len() {
            executor.undo().unwrap();
        }

        prop_assert_eq!(executor.store(), &before);
    }
}
