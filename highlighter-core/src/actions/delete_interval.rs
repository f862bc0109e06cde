//! Delete interval action
//!
//! Removes a single record by id; rollback restores the exact record.

use crate::action::Action;
use crate::error::{EngineError, Result};
use crate::interval::{Interval, IntervalEvent, IntervalId};
use crate::store::IntervalStore;

pub struct DeleteIntervalAction {
    id: IntervalId,

    /// Snapshot of the removed record (set after execution)
    removed: Option<Interval>,
}

impl DeleteIntervalAction {
    pub fn new(id: IntervalId) -> Self {
        Self { id, removed: None }
    }
}

impl Action for DeleteIntervalAction {
    fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        let event = store.remove(&self.id)?;
        if let IntervalEvent::Deleted(interval) = &event {
            self.removed = Some(interval.clone());
        }
        Ok(vec![event])
    }

    fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        let interval = self
            .removed
            .clone()
            .ok_or(EngineError::IntervalNotFound(self.id))?;
        Ok(vec![store.restore(interval)?])
    }

    fn description(&self) -> String {
        match &self.removed {
            Some(interval) => format!("Delete {}", interval.kind.noun()),
            None => "Delete interval".to_string(),
        }
    }
}
