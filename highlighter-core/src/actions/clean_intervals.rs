//! Clean intervals action
//!
//! Removes a sub-range from every intersecting record of one kind by
//! deleting, trimming or splitting them.
//!
//! The inverse is not a single insert or clean: it deletes every record the
//! clean inserted, then restores every record it deleted or updated from the
//! pre-mutation snapshot held in the [`CleanPlan`].

use crate::action::Action;
use crate::error::{EngineError, Result};
use crate::interval::{IntervalEvent, IntervalKind};
use crate::store::{CleanPlan, CleanResult, IntervalStore};

/// Action that cleans `[a, b]` out of records of one kind
pub struct CleanIntervalsAction {
    kind: IntervalKind,
    a: f64,
    b: f64,

    /// Plan computed on first execution (set after execution)
    plan: Option<CleanPlan>,
}

impl CleanIntervalsAction {
    pub fn new(kind: IntervalKind, a: f64, b: f64) -> Self {
        Self {
            kind,
            a,
            b,
            plan: None,
        }
    }

    /// Ids touched by the clean (after execution)
    pub fn result(&self) -> Option<CleanResult> {
        self.plan.as_ref().map(CleanPlan::result)
    }
}

impl Action for CleanIntervalsAction {
    fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        // Redo replays the original plan so split halves keep their ids
        let plan = match self.plan.take() {
            Some(plan) => plan,
            None => store.plan_clean(self.kind, self.a, self.b)?,
        };
        let applied = store.apply_clean(&plan);
        self.plan = Some(plan);
        applied
    }

    fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        let Some(plan) = &self.plan else {
            return Ok(Vec::new());
        };

        let missing = plan
            .inserts
            .iter()
            .chain(plan.updates.iter().map(|(_, after)| after))
            .find(|i| !store.contains(&i.id));
        if let Some(missing) = missing {
            return Err(EngineError::IntervalNotFound(missing.id));
        }

        let mut events = Vec::new();
        for interval in &plan.inserts {
            events.push(store.remove(&interval.id)?);
        }
        for original in plan.originals() {
            if store.contains(&original.id) {
                events.push(store.remove(&original.id)?);
            }
            events.push(store.restore(original.clone())?);
        }
        Ok(events)
    }

    fn description(&self) -> String {
        match self.kind {
            IntervalKind::Highlight => "Clear highlight",
            IntervalKind::Strikethrough => "Clear strikethrough",
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::TimelineId;

    fn store_with(ranges: &[(f64, f64)]) -> IntervalStore {
        let mut store = IntervalStore::new(TimelineId::new());
        for &(start, end) in ranges {
            store.insert(IntervalKind::Highlight, start, end).unwrap();
        }
        store
    }

    #[test]
    fn test_split_rollback_restores_exactly() {
        let mut store = store_with(&[(0.0, 10.0)]);
        let before = store.clone();

        let mut action = CleanIntervalsAction::new(IntervalKind::Highlight, 7.0, 3.0);
        action.execute(&mut store).unwrap();
        assert_eq!(store.len(), 2);
        let result = action.result().unwrap();
        assert_eq!(result.inserted_ids.len(), 1);
        assert_eq!(result.updated_ids.len(), 1);

        action.rollback(&mut store).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn test_redo_reuses_split_ids() {
        let mut store = store_with(&[(0.0, 10.0)]);
        let mut action = CleanIntervalsAction::new(IntervalKind::Highlight, 3.0, 7.0);
        action.execute(&mut store).unwrap();
        let after_first = store.clone();

        action.rollback(&mut store).unwrap();
        action.execute(&mut store).unwrap();
        assert_eq!(store, after_first);
    }

    #[test]
    fn test_mixed_cases_rollback() {
        let mut store = store_with(&[(1.0, 4.0), (2.0, 3.0), (3.5, 9.0), (0.0, 20.0), (15.0, 16.0)]);
        let before = store.clone();

        let mut action = CleanIntervalsAction::new(IntervalKind::Highlight, 2.0, 8.0);
        let events = action.execute(&mut store).unwrap();
        // one delete, three updates, one split insert
        assert_eq!(events.len(), 5);
        assert!(store.intervals_intersecting(IntervalKind::Highlight, 2.0, 8.0).is_empty());

        action.rollback(&mut store).unwrap();
        assert_eq!(store, before);
    }

    #[test]
    fn test_rollback_fails_when_split_half_is_gone() {
        let mut store = store_with(&[(0.0, 10.0)]);
        let mut action = CleanIntervalsAction::new(IntervalKind::Highlight, 3.0, 7.0);
        action.execute(&mut store).unwrap();

        let inserted = action.result().unwrap().inserted_ids[0];
        store.remove(&inserted).unwrap();
        let before = store.clone();

        assert!(action.rollback(&mut store).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_description() {
        assert_eq!(
            CleanIntervalsAction::new(IntervalKind::Strikethrough, 0.0, 1.0).description(),
            "Clear strikethrough"
        );
    }
}
