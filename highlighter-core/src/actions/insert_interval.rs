//! Insert interval action
//!
//! Handles adding a single highlight or strikethrough record.

use crate::action::Action;
use crate::error::{EngineError, Result};
use crate::interval::{Interval, IntervalEvent, IntervalId, IntervalKind};
use crate::store::IntervalStore;

/// Action that inserts one interval spanning two endpoints (either order)
pub struct InsertIntervalAction {
    kind: IntervalKind,
    a: f64,
    b: f64,

    /// The record created on first execution; redo puts back this exact record
    created: Option<Interval>,
}

impl InsertIntervalAction {
    pub fn new(kind: IntervalKind, a: f64, b: f64) -> Self {
        Self {
            kind,
            a,
            b,
            created: None,
        }
    }

    /// Get the ID of the created interval (after execution)
    pub fn created_id(&self) -> Option<IntervalId> {
        self.created.as_ref().map(|i| i.id)
    }
}

impl Action for InsertIntervalAction {
    fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        if let Some(interval) = &self.created {
            return Ok(vec![store.restore(interval.clone())?]);
        }

        let id = store.insert(self.kind, self.a, self.b)?;
        let interval = store
            .get(&id)
            .cloned()
            .ok_or(EngineError::IntervalNotFound(id))?;
        self.created = Some(interval.clone());
        Ok(vec![IntervalEvent::Inserted(interval)])
    }

    fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
        match &self.created {
            Some(interval) => Ok(vec![store.remove(&interval.id)?]),
            None => Ok(Vec::new()),
        }
    }

    fn description(&self) -> String {
        format!("Create {}", self.kind.noun())
    }
}
