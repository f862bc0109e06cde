//! Action system for undo/redo functionality
//!
//! Every edit of the interval store is an [`Action`]: it knows how to apply
//! itself and how to exactly invert what it applied, using state captured
//! while executing (created records, pre-mutation snapshots).
//!
//! ## Architecture
//!
//! - `Action` trait: execute() and rollback(), both yielding the
//!   [`IntervalEvent`]s they produced
//! - `ActionExecutor`: owns the store and the undo/redo stacks
//! - Store mutators are `pub(crate)`; external code gets read-only access via
//!   `ActionExecutor::store()`
//!
//! ## Persistence
//!
//! The engine applies edits optimistically. `execute_with_backend()` forwards
//! the resulting events to an [`IntervalBackend`]; if the backend rejects one,
//! the local change is rolled back and the caller is told which events the
//! backend had already accepted.

use crate::error::{EngineError, Result};
use crate::interval::IntervalEvent;
use crate::store::IntervalStore;

/// Persistence collaborator receiving interval mutations
///
/// Implementations decide how (and whether) to durably store records; the
/// engine never retries a rejected event.
pub trait IntervalBackend {
    /// Persist one mutation. Return a human-readable message on failure.
    fn apply(&mut self, event: &IntervalEvent) -> std::result::Result<(), String>;
}

/// Backend that accepts everything and stores nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl IntervalBackend for NullBackend {
    fn apply(&mut self, _event: &IntervalEvent) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Action trait for undo/redo operations
///
/// `rollback()` must restore the store bit-for-bit: same ids, same
/// boundaries. Both methods must validate before mutating, so an `Err`
/// leaves the store untouched.
pub trait Action: Send {
    /// Apply this action to the store
    fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>>;

    /// Undo this action
    fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>>;

    /// Human-readable description (for UI display)
    fn description(&self) -> String;
}

/// Result of an undo request
#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Undone {
        description: String,
        events: Vec<IntervalEvent>,
    },
    /// The undo stack was empty. Informational, not an error.
    NothingToUndo,
}

/// Result of a redo request
#[derive(Debug, Clone, PartialEq)]
pub enum RedoOutcome {
    Redone {
        description: String,
        events: Vec<IntervalEvent>,
    },
    NothingToRedo,
}

/// Action executor that wraps the interval store and manages undo/redo
///
/// This is the only way to get mutable access to the store, ensuring
/// all mutations go through the action system.
pub struct ActionExecutor {
    store: IntervalStore,

    /// Stack of executed actions (for undo)
    undo_stack: Vec<Box<dyn Action>>,

    /// Stack of undone actions (for redo)
    redo_stack: Vec<Box<dyn Action>>,

    /// Maximum number of actions kept for undo; `None` keeps everything
    max_undo_depth: Option<usize>,
}

impl ActionExecutor {
    pub fn new(store: IntervalStore) -> Self {
        Self {
            store,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_depth: Some(100),
        }
    }

    /// Read-only access to the store
    pub fn store(&self) -> &IntervalStore {
        &self.store
    }

    /// Execute an action and add it to the undo stack
    ///
    /// An action that produced no events changed nothing and is not
    /// recorded. A recorded action clears the redo stack.
    pub fn execute(&mut self, mut action: Box<dyn Action>) -> Result<Vec<IntervalEvent>> {
        let events = action.execute(&mut self.store)?;
        self.record(action, &events);
        Ok(events)
    }

    /// Execute an action and forward its events to `backend`
    ///
    /// If the backend rejects an event, the local change is rolled back and
    /// `EngineError::Persistence` carries the events already accepted.
    pub fn execute_with_backend(
        &mut self,
        mut action: Box<dyn Action>,
        backend: &mut dyn IntervalBackend,
    ) -> Result<Vec<IntervalEvent>> {
        let events = action.execute(&mut self.store)?;

        if let Err(err) = forward(backend, &events) {
            log::warn!("Backend rejected '{}', rolling back", action.description());
            action.rollback(&mut self.store)?;
            return Err(err);
        }

        self.record(action, &events);
        Ok(events)
    }

    /// Undo the last action
    ///
    /// If the rollback itself fails, the action stays on the undo stack.
    pub fn undo(&mut self) -> Result<UndoOutcome> {
        let Some(mut action) = self.undo_stack.pop() else {
            return Ok(UndoOutcome::NothingToUndo);
        };

        match action.rollback(&mut self.store) {
            Ok(events) => {
                let description = action.description();
                log::info!("Undone: {}", description);
                self.redo_stack.push(action);
                Ok(UndoOutcome::Undone {
                    description,
                    events,
                })
            }
            Err(err) => {
                log::warn!("Undo of '{}' failed: {}", action.description(), err);
                self.undo_stack.push(action);
                Err(err)
            }
        }
    }

    /// Undo the last action and forward the inverse events to `backend`
    ///
    /// Rollback happens locally first; if the backend rejects the inverse,
    /// the action is re-applied locally and stays on the undo stack.
    pub fn undo_with_backend(&mut self, backend: &mut dyn IntervalBackend) -> Result<UndoOutcome> {
        let Some(mut action) = self.undo_stack.pop() else {
            return Ok(UndoOutcome::NothingToUndo);
        };

        let events = match action.rollback(&mut self.store) {
            Ok(events) => events,
            Err(err) => {
                self.undo_stack.push(action);
                return Err(err);
            }
        };

        if let Err(err) = forward(backend, &events) {
            log::warn!("Backend rejected undo of '{}'", action.description());
            let reapplied = action.execute(&mut self.store);
            self.undo_stack.push(action);
            reapplied?;
            return Err(err);
        }

        let description = action.description();
        self.redo_stack.push(action);
        Ok(UndoOutcome::Undone {
            description,
            events,
        })
    }

    /// Redo the last undone action
    pub fn redo(&mut self) -> Result<RedoOutcome> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(RedoOutcome::NothingToRedo);
        };

        match action.execute(&mut self.store) {
            Ok(events) => {
                let description = action.description();
                log::info!("Redone: {}", description);
                self.push_undo(action);
                Ok(RedoOutcome::Redone {
                    description,
                    events,
                })
            }
            Err(err) => {
                self.redo_stack.push(action);
                Err(err)
            }
        }
    }

    /// Redo the last undone action and forward its events to `backend`
    ///
    /// If the backend rejects an event, the action is rolled back locally
    /// and stays on the redo stack.
    pub fn redo_with_backend(&mut self, backend: &mut dyn IntervalBackend) -> Result<RedoOutcome> {
        let Some(mut action) = self.redo_stack.pop() else {
            return Ok(RedoOutcome::NothingToRedo);
        };

        let events = match action.execute(&mut self.store) {
            Ok(events) => events,
            Err(err) => {
                self.redo_stack.push(action);
                return Err(err);
            }
        };

        if let Err(err) = forward(backend, &events) {
            log::warn!("Backend rejected redo of '{}'", action.description());
            let rolled_back = action.rollback(&mut self.store);
            self.redo_stack.push(action);
            rolled_back?;
            return Err(err);
        }

        let description = action.description();
        self.push_undo(action);
        Ok(RedoOutcome::Redone {
            description,
            events,
        })
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the next action to undo
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|a| a.description())
    }

    /// Description of the next action to redo
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|a| a.description())
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Set the maximum undo depth; `None` removes the bound
    pub fn set_max_undo_depth(&mut self, depth: Option<usize>) {
        self.max_undo_depth = depth;
        self.trim_undo_stack();
    }

    fn record(&mut self, action: Box<dyn Action>, events: &[IntervalEvent]) {
        if events.is_empty() {
            log::debug!("'{}' changed nothing; not recorded", action.description());
            return;
        }
        self.redo_stack.clear();
        self.push_undo(action);
    }

    fn push_undo(&mut self, action: Box<dyn Action>) {
        self.undo_stack.push(action);
        self.trim_undo_stack();
    }

    fn trim_undo_stack(&mut self) {
        if let Some(depth) = self.max_undo_depth {
            if self.undo_stack.len() > depth {
                let remove_count = self.undo_stack.len() - depth;
                self.undo_stack.drain(0..remove_count);
            }
        }
    }
}

/// Send events to the backend in order, stopping at the first rejection
fn forward(backend: &mut dyn IntervalBackend, events: &[IntervalEvent]) -> Result<()> {
    for (i, event) in events.iter().enumerate() {
        if let Err(message) = backend.apply(event) {
            return Err(EngineError::Persistence {
                message,
                applied: events[..i].to_vec(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::{Interval, IntervalKind, TimelineId};

    // Test action that inserts one fixed record
    struct TestAction {
        description: String,
        interval: Interval,
    }

    impl TestAction {
        fn new(store: &IntervalStore, description: &str, start: f64) -> Self {
            Self {
                description: description.to_string(),
                interval: Interval::new(store.timeline_id(), IntervalKind::Highlight, start, start + 1.0),
            }
        }
    }

    impl Action for TestAction {
        fn execute(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
            Ok(vec![store.restore(self.interval.clone())?])
        }

        fn rollback(&mut self, store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
            Ok(vec![store.remove(&self.interval.id)?])
        }

        fn description(&self) -> String {
            self.description.clone()
        }
    }

    struct NoopAction;

    impl Action for NoopAction {
        fn execute(&mut self, _store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
            Ok(Vec::new())
        }

        fn rollback(&mut self, _store: &mut IntervalStore) -> Result<Vec<IntervalEvent>> {
            Ok(Vec::new())
        }

        fn description(&self) -> String {
            "Nothing".to_string()
        }
    }

    /// Backend that rejects after accepting `budget` events
    struct FlakyBackend {
        budget: usize,
        accepted: Vec<IntervalEvent>,
    }

    impl IntervalBackend for FlakyBackend {
        fn apply(&mut self, event: &IntervalEvent) -> std::result::Result<(), String> {
            if self.budget == 0 {
                return Err("offline".to_string());
            }
            self.budget -= 1;
            self.accepted.push(event.clone());
            Ok(())
        }
    }

    fn executor() -> ActionExecutor {
        ActionExecutor::new(IntervalStore::new(TimelineId::new()))
    }

    #[test]
    fn test_action_executor_basic() {
        let mut executor = executor();
        assert!(!executor.can_undo());
        assert!(!executor.can_redo());

        let action = TestAction::new(executor.store(), "Test Action", 0.0);
        executor.execute(Box::new(action)).unwrap();
        assert!(executor.can_undo());
        assert_eq!(executor.store().len(), 1);

        let outcome = executor.undo().unwrap();
        assert!(matches!(outcome, UndoOutcome::Undone { ref description, .. } if description == "Test Action"));
        assert!(executor.store().is_empty());
        assert!(executor.can_redo());

        assert!(matches!(executor.redo().unwrap(), RedoOutcome::Redone { .. }));
        assert_eq!(executor.store().len(), 1);
        assert!(!executor.can_redo());
    }

    #[test]
    fn test_nothing_to_undo() {
        let mut executor = executor();
        assert_eq!(executor.undo().unwrap(), UndoOutcome::NothingToUndo);
        assert_eq!(executor.redo().unwrap(), RedoOutcome::NothingToRedo);
    }

    #[test]
    fn test_noop_action_not_recorded() {
        let mut executor = executor();
        executor.execute(Box::new(NoopAction)).unwrap();
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_new_action_clears_redo() {
        let mut executor = executor();
        let a1 = TestAction::new(executor.store(), "Action 1", 0.0);
        let a2 = TestAction::new(executor.store(), "Action 2", 2.0);
        let a3 = TestAction::new(executor.store(), "Action 3", 4.0);
        executor.execute(Box::new(a1)).unwrap();
        executor.execute(Box::new(a2)).unwrap();
        executor.undo().unwrap();
        assert_eq!(executor.redo_description(), Some("Action 2".to_string()));
        assert_eq!(executor.undo_description(), Some("Action 1".to_string()));

        executor.execute(Box::new(a3)).unwrap();
        assert!(!executor.can_redo());
        assert_eq!(executor.undo_depth(), 2);
    }

    #[test]
    fn test_max_undo_depth() {
        let mut executor = executor();
        executor.set_max_undo_depth(Some(3));
        for i in 0..4 {
            let action = TestAction::new(executor.store(), &format!("Action {}", i + 1), i as f64 * 2.0);
            executor.execute(Box::new(action)).unwrap();
        }
        assert_eq!(executor.undo_depth(), 3);
        assert_eq!(executor.undo_description(), Some("Action 4".to_string()));

        executor.set_max_undo_depth(None);
        let action = TestAction::new(executor.store(), "Action 5", 20.0);
        executor.execute(Box::new(action)).unwrap();
        assert_eq!(executor.undo_depth(), 4);
    }

    #[test]
    fn test_backend_rejection_rolls_back() {
        let mut executor = executor();
        let mut backend = FlakyBackend { budget: 0, accepted: Vec::new() };
        let action = TestAction::new(executor.store(), "Create highlight", 0.0);

        let err = executor.execute_with_backend(Box::new(action), &mut backend).unwrap_err();
        assert!(matches!(err, EngineError::Persistence { ref applied, .. } if applied.is_empty()));
        assert!(executor.store().is_empty());
        assert!(!executor.can_undo());
    }

    #[test]
    fn test_backend_undo_rejection_keeps_action() {
        let mut executor = executor();
        let mut backend = FlakyBackend { budget: 1, accepted: Vec::new() };
        let action = TestAction::new(executor.store(), "Create highlight", 0.0);
        executor.execute_with_backend(Box::new(action), &mut backend).unwrap();
        assert_eq!(backend.accepted.len(), 1);

        assert!(executor.undo_with_backend(&mut backend).is_err());
        assert_eq!(executor.store().len(), 1);
        assert_eq!(executor.undo_depth(), 1);

        assert!(matches!(
            executor.undo_with_backend(&mut NullBackend).unwrap(),
            UndoOutcome::Undone { .. }
        ));
        assert!(executor.store().is_empty());
    }

    #[test]
    fn test_backend_redo_rejection_keeps_redo_entry() {
        let mut executor = executor();
        let action = TestAction::new(executor.store(), "Create highlight", 0.0);
        executor.execute(Box::new(action)).unwrap();
        executor.undo().unwrap();

        let mut backend = FlakyBackend { budget: 0, accepted: Vec::new() };
        assert!(executor.redo_with_backend(&mut backend).is_err());
        assert!(executor.store().is_empty());
        assert!(executor.can_redo());
        assert!(!executor.can_undo());

        assert!(matches!(
            executor.redo_with_backend(&mut NullBackend).unwrap(),
            RedoOutcome::Redone { .. }
        ));
        assert_eq!(executor.store().len(), 1);
    }
}
