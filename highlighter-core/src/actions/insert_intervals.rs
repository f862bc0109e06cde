//! Batch insert action
//!
//! Inserts several records of one kind as a single undoable step (used for
//! striking every long pause at once).

use crate::action::Action;
use crate::error::{EngineError, Result};
use crate::interval::{Interval, IntervalEvent, IntervalKind};
use crate::store::{normalize_range, IntervalStore};

pub struct InsertIntervalsAction {
    kind: IntervalKind,
    ranges: Vec<(f64, f64)>,
    description: String,

    /// Records created on first execution
    created: Vec<Interval>,
}

impl InsertIntervalsAction {
    pub fn new(kind: IntervalKind, ranges: Vec<(f64, f64)>, description: impl Into<String>) -> Self {
        Self {
            kind,
            ranges,
            description: description.into(),
            created: Vec::new(),
        }
    }
}

impl Action for InsertIntervalsAction {
    fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        if self.created.is_empty() {
            // Validate every range before touching the store
            let normalized = self
                .ranges
                .iter()
                .map(|&(a, b)| normalize_range(a, b))
                .collect::<Result<Vec<_>>>()?;
            let (timeline_id, kind) = (store.timeline_id(), self.kind);
            self.created = normalized
                .into_iter()
                .map(|(start, end)| Interval::new(timeline_id, kind, start, end))
                .collect();
        }

        self.created
            .iter()
            .map(|interval| store.restore(interval.clone()))
            .collect()
    }

    fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        if let Some(missing) = self.created.iter().find(|i| !store.contains(&i.id)) {
            return Err(EngineError::IntervalNotFound(missing.id));
        }
        self.created
            .iter()
            .map(|interval| store.remove(&interval.id))
            .collect()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::TimelineId;

    #[test]
    fn test_batch_insert_and_rollback() {
        let mut store = IntervalStore::new(TimelineId::new());
        let mut action = InsertIntervalsAction::new(
            IntervalKind::Strikethrough,
            vec![(1.0, 4.0), (9.0, 7.0)],
            "Strike long pauses",
        );

        let events = action.execute(&mut store).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(store.strike_pairs(), vec![(1.0, 4.0), (7.0, 9.0)]);

        action.rollback(&mut store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_one_bad_range_inserts_nothing() {
        let mut store = IntervalStore::new(TimelineId::new());
        let mut action = InsertIntervalsAction::new(
            IntervalKind::Strikethrough,
            vec![(1.0, 4.0), (5.0, 5.0)],
            "Strike long pauses",
        );
        assert!(matches!(
            action.execute(&mut store),
            Err(EngineError::InvalidRange { .. })
        ));
        assert!(store.is_empty());
    }
}
