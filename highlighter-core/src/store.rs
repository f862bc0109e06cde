//! Interval store
//!
//! Owns every [`Interval`] record of one timeline. Inserts are always whole,
//! un-split records; overlapping records of the same kind are an accepted
//! steady state. Overlap is only ever resolved by [`IntervalStore::clean`],
//! which surgically removes a sub-range from existing records of one kind.
//!
//! Mutations that must be undoable go through the action system
//! ([`crate::action`]); the low-level `restore`/`remove`/`set_bounds`
//! methods are `pub(crate)` for that reason.

use crate::error::{EngineError, Result};
use crate::interval::{Interval, IntervalEvent, IntervalId, IntervalKind, TimelineId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ids touched by a clean operation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanResult {
    pub deleted_ids: Vec<IntervalId>,
    pub updated_ids: Vec<IntervalId>,
    pub inserted_ids: Vec<IntervalId>,
}

impl CleanResult {
    pub fn is_empty(&self) -> bool {
        self.deleted_ids.is_empty() && self.updated_ids.is_empty() && self.inserted_ids.is_empty()
    }
}

/// The full set of sub-operations a clean will perform
///
/// Computed up front by [`IntervalStore::plan_clean`] without touching the
/// store, so it can be validated as a whole, applied, and later replayed
/// (redo) with the same ids. Holds pre-mutation snapshots of every record it
/// deletes or updates.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanPlan {
    pub kind: IntervalKind,
    pub start: f64,
    pub end: f64,
    /// Records removed entirely (snapshot)
    pub deletes: Vec<Interval>,
    /// (before, after) pairs for trimmed records
    pub updates: Vec<(Interval, Interval)>,
    /// New right-hand halves produced by splits
    pub inserts: Vec<Interval>,
}

impl CleanPlan {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.inserts.is_empty()
    }

    pub fn result(&self) -> CleanResult {
        CleanResult {
            deleted_ids: self.deletes.iter().map(|i| i.id).collect(),
            updated_ids: self.updates.iter().map(|(before, _)| before.id).collect(),
            inserted_ids: self.inserts.iter().map(|i| i.id).collect(),
        }
    }

    /// Pre-mutation snapshots of every record this plan deletes or updates
    pub fn originals(&self) -> impl Iterator<Item = &Interval> {
        self.deletes
            .iter()
            .chain(self.updates.iter().map(|(before, _)| before))
    }
}

/// How a single intersecting record is affected by a clean range
enum CleanCase {
    /// Record lies entirely inside the range
    Delete,
    /// Range lies strictly inside the record
    Split,
    /// Record overlaps the range on its right side only
    TrimEnd,
    /// Record overlaps the range on its left side only
    TrimStart,
}

fn classify(interval: &Interval, start: f64, end: f64) -> CleanCase {
    let (h_start, h_end) = (interval.start_time, interval.end_time);
    if h_start >= start && h_end <= end {
        CleanCase::Delete
    } else if h_start < start && h_end > end {
        CleanCase::Split
    } else if h_start < start {
        CleanCase::TrimEnd
    } else {
        CleanCase::TrimStart
    }
}

/// Normalize two raw endpoints into `(min, max)`
///
/// Anchor and cursor may arrive in either order. Zero-length and non-finite
/// ranges are rejected with [`EngineError::InvalidRange`].
pub fn normalize_range(a: f64, b: f64) -> Result<(f64, f64)> {
    let (start, end) = (a.min(b), a.max(b));
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(EngineError::InvalidRange { start, end });
    }
    Ok((start, end))
}

/// All interval records of one timeline
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalStore {
    timeline_id: TimelineId,
    intervals: HashMap<IntervalId, Interval>,
}

impl IntervalStore {
    /// Create an empty store for a timeline
    pub fn new(timeline_id: TimelineId) -> Self {
        Self {
            timeline_id,
            intervals: HashMap::new(),
        }
    }

    /// Create a store from records previously persisted for this timeline
    pub fn with_intervals(timeline_id: TimelineId, intervals: Vec<Interval>) -> Result<Self> {
        let mut store = Self::new(timeline_id);
        for interval in intervals {
            store.restore(interval)?;
        }
        Ok(store)
    }

    pub fn timeline_id(&self) -> TimelineId {
        self.timeline_id
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn get(&self, id: &IntervalId) -> Option<&Interval> {
        self.intervals.get(id)
    }

    pub fn contains(&self, id: &IntervalId) -> bool {
        self.intervals.contains_key(id)
    }

    /// Iterate all records in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.values()
    }

    /// Insert a new interval spanning the two endpoints, in either order
    ///
    /// Never merges with or splits existing records, even if they overlap.
    pub fn insert(&mut self, kind: IntervalKind, a: f64, b: f64) -> Result<IntervalId> {
        let (start, end) = normalize_range(a, b)?;
        let interval = Interval::new(self.timeline_id, kind, start, end);
        let id = interval.id;
        self.restore(interval)?;
        log::debug!("Inserted {} {} [{}, {}]", kind.noun(), id, start, end);
        Ok(id)
    }

    /// Remove `[a, b]` from every intersecting record of `kind`
    pub fn clean(&mut self, kind: IntervalKind, a: f64, b: f64) -> Result<CleanResult> {
        let plan = self.plan_clean(kind, a, b)?;
        self.apply_clean(&plan)?;
        Ok(plan.result())
    }

    /// Compute the delete/update/insert set a clean would perform
    ///
    /// Does not mutate the store. An empty plan means nothing intersects.
    pub fn plan_clean(&self, kind: IntervalKind, a: f64, b: f64) -> Result<CleanPlan> {
        let (start, end) = normalize_range(a, b)?;
        let mut plan = CleanPlan {
            kind,
            start,
            end,
            deletes: Vec::new(),
            updates: Vec::new(),
            inserts: Vec::new(),
        };

        for interval in self.intervals_intersecting(kind, start, end) {
            match classify(interval, start, end) {
                CleanCase::Delete => plan.deletes.push(interval.clone()),
                CleanCase::Split => {
                    let mut left = interval.clone();
                    left.end_time = start;
                    plan.updates.push((interval.clone(), left));
                    plan.inserts.push(Interval::new(
                        self.timeline_id,
                        kind,
                        end,
                        interval.end_time,
                    ));
                }
                CleanCase::TrimEnd => {
                    let mut trimmed = interval.clone();
                    trimmed.end_time = start;
                    plan.updates.push((interval.clone(), trimmed));
                }
                CleanCase::TrimStart => {
                    let mut trimmed = interval.clone();
                    trimmed.start_time = end;
                    plan.updates.push((interval.clone(), trimmed));
                }
            }
        }

        Ok(plan)
    }

    /// Apply a previously computed plan
    ///
    /// Every record the plan deletes or updates must still exist; the check
    /// happens before anything is touched, so a stale plan leaves the store
    /// unchanged.
    pub fn apply_clean(&mut self, plan: &CleanPlan) -> Result<Vec<IntervalEvent>> {
        if let Some(missing) = plan.originals().find(|i| !self.contains(&i.id)) {
            return Err(EngineError::IntervalNotFound(missing.id));
        }
        if let Some(foreign) = plan.inserts.iter().find(|i| i.timeline_id != self.timeline_id) {
            return Err(EngineError::TimelineMismatch {
                expected: self.timeline_id,
                actual: foreign.timeline_id,
            });
        }

        let mut events = Vec::with_capacity(
            plan.deletes.len() + plan.updates.len() + plan.inserts.len(),
        );
        for interval in &plan.deletes {
            events.push(self.remove(&interval.id)?);
        }
        for (_, after) in &plan.updates {
            events.push(self.set_bounds(&after.id, after.start_time, after.end_time)?);
        }
        for interval in &plan.inserts {
            events.push(self.restore(interval.clone())?);
        }

        log::debug!(
            "Cleaned {} [{}, {}]: {} deleted, {} updated, {} inserted",
            plan.kind.noun(),
            plan.start,
            plan.end,
            plan.deletes.len(),
            plan.updates.len(),
            plan.inserts.len()
        );
        Ok(events)
    }

    /// Records of one kind, ordered by start time (ties by end, then id)
    pub fn intervals_of_kind(&self, kind: IntervalKind) -> Vec<&Interval> {
        let mut result: Vec<&Interval> = self.intervals.values().filter(|i| i.kind == kind).collect();
        sort_by_time(&mut result);
        result
    }

    /// Records of one kind that share a non-empty span with `[start, end]`
    pub fn intervals_intersecting(&self, kind: IntervalKind, start: f64, end: f64) -> Vec<&Interval> {
        let mut result: Vec<&Interval> = self
            .intervals
            .values()
            .filter(|i| i.kind == kind && i.intersects(start, end))
            .collect();
        sort_by_time(&mut result);
        result
    }

    /// Strikethrough records as `(start, end)` pairs, for the relative-time mapper
    pub fn strike_pairs(&self) -> Vec<(f64, f64)> {
        self.intervals_of_kind(IntervalKind::Strikethrough)
            .into_iter()
            .map(|i| (i.start_time, i.end_time))
            .collect()
    }

    /// Owned copy of every record, ordered by id
    ///
    /// Two stores with equal snapshots hold exactly the same records.
    pub fn snapshot(&self) -> Vec<Interval> {
        let mut records: Vec<Interval> = self.intervals.values().cloned().collect();
        records.sort_by_key(|i| i.id);
        records
    }

    // === MUTATION METHODS (pub(crate) - only accessible to actions) ===

    /// Put a record back into the store exactly as given (same id, same bounds)
    pub(crate) fn restore(&mut self, interval: Interval) -> Result<IntervalEvent> {
        if interval.timeline_id != self.timeline_id {
            return Err(EngineError::TimelineMismatch {
                expected: self.timeline_id,
                actual: interval.timeline_id,
            });
        }
        if !(interval.start_time < interval.end_time) {
            return Err(EngineError::InvalidRange {
                start: interval.start_time,
                end: interval.end_time,
            });
        }
        self.intervals.insert(interval.id, interval.clone());
        Ok(IntervalEvent::Inserted(interval))
    }

    /// Remove a record by id
    pub(crate) fn remove(&mut self, id: &IntervalId) -> Result<IntervalEvent> {
        self.intervals
            .remove(id)
            .map(IntervalEvent::Deleted)
            .ok_or(EngineError::IntervalNotFound(*id))
    }

    /// Move the boundaries of an existing record
    pub(crate) fn set_bounds(&mut self, id: &IntervalId, start: f64, end: f64) -> Result<IntervalEvent> {
        if !(start < end) {
            return Err(EngineError::InvalidRange { start, end });
        }
        let interval = self
            .intervals
            .get_mut(id)
            .ok_or(EngineError::IntervalNotFound(*id))?;
        let before = interval.clone();
        interval.start_time = start;
        interval.end_time = end;
        Ok(IntervalEvent::Updated {
            before,
            after: interval.clone(),
        })
    }
}

fn sort_by_time(intervals: &mut [&Interval]) {
    intervals.sort_by(|a, b| {
        a.start_time
            .total_cmp(&b.start_time)
            .then(a.end_time.total_cmp(&b.end_time))
            .then(a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(store: &IntervalStore, kind: IntervalKind) -> Vec<(f64, f64)> {
        store
            .intervals_of_kind(kind)
            .into_iter()
            .map(|i| (i.start_time, i.end_time))
            .collect()
    }

    #[test]
    fn test_insert_normalizes_endpoints() {
        let mut store = IntervalStore::new(TimelineId::new());
        let a = store.insert(IntervalKind::Highlight, 7.0, 3.0).unwrap();
        let interval = store.get(&a).unwrap();
        assert_eq!((interval.start_time, interval.end_time), (3.0, 7.0));
        assert_eq!(interval.timeline_id, store.timeline_id());
    }

    #[test]
    fn test_insert_rejects_zero_length() {
        let mut store = IntervalStore::new(TimelineId::new());
        let err = store.insert(IntervalKind::Highlight, 4.0, 4.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRange { .. }));
        assert!(store.is_empty());

        assert!(store.insert(IntervalKind::Highlight, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_insert_does_not_merge_overlaps() {
        let mut store = IntervalStore::new(TimelineId::new());
        store.insert(IntervalKind::Highlight, 0.0, 10.0).unwrap();
        store.insert(IntervalKind::Highlight, 0.0, 10.0).unwrap();
        store.insert(IntervalKind::Highlight, 5.0, 15.0).unwrap();
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_clean_split() {
        let mut store = IntervalStore::new(TimelineId::new());
        let id = store.insert(IntervalKind::Highlight, 0.0, 10.0).unwrap();

        let result = store.clean(IntervalKind::Highlight, 3.0, 7.0).unwrap();
        assert_eq!(result.updated_ids, vec![id]);
        assert_eq!(result.inserted_ids.len(), 1);
        assert!(result.deleted_ids.is_empty());

        assert_eq!(bounds(&store, IntervalKind::Highlight), vec![(0.0, 3.0), (7.0, 10.0)]);
        assert_eq!(store.get(&id).unwrap().end_time, 3.0);
        assert!(store.intervals_intersecting(IntervalKind::Highlight, 3.0, 7.0).is_empty());
    }

    #[test]
    fn test_clean_delete_and_trims() {
        let mut store = IntervalStore::new(TimelineId::new());
        let inside = store.insert(IntervalKind::Strikethrough, 4.0, 6.0).unwrap();
        let left = store.insert(IntervalKind::Strikethrough, 1.0, 5.0).unwrap();
        let right = store.insert(IntervalKind::Strikethrough, 5.0, 9.0).unwrap();
        let untouched = store.insert(IntervalKind::Strikethrough, 10.0, 12.0).unwrap();

        let result = store.clean(IntervalKind::Strikethrough, 3.0, 7.0).unwrap();
        assert_eq!(result.deleted_ids, vec![inside]);
        assert_eq!(result.updated_ids.len(), 2);
        assert!(result.inserted_ids.is_empty());

        assert_eq!(store.get(&left).unwrap().end_time, 3.0);
        assert_eq!(store.get(&right).unwrap().start_time, 7.0);
        assert_eq!(store.get(&untouched).unwrap().start_time, 10.0);
        assert!(!store.contains(&inside));
    }

    #[test]
    fn test_clean_boundary_cases() {
        let mut store = IntervalStore::new(TimelineId::new());
        // Shares the clean range's start: fully inside, deleted
        let same_start = store.insert(IntervalKind::Highlight, 3.0, 5.0).unwrap();
        // Ends exactly at the clean range's end: trimmed at start of range
        let ends_at_end = store.insert(IntervalKind::Highlight, 1.0, 7.0).unwrap();
        // Touches but does not intersect
        let touching = store.insert(IntervalKind::Highlight, 7.0, 8.0).unwrap();

        let result = store.clean(IntervalKind::Highlight, 3.0, 7.0).unwrap();
        assert_eq!(result.deleted_ids, vec![same_start]);
        assert_eq!(result.updated_ids, vec![ends_at_end]);
        assert_eq!(store.get(&ends_at_end).unwrap().end_time, 3.0);
        assert_eq!(store.get(&touching).unwrap().start_time, 7.0);
    }

    #[test]
    fn test_clean_only_touches_its_kind() {
        let mut store = IntervalStore::new(TimelineId::new());
        let strike = store.insert(IntervalKind::Strikethrough, 0.0, 10.0).unwrap();
        store.insert(IntervalKind::Highlight, 0.0, 10.0).unwrap();

        store.clean(IntervalKind::Highlight, 0.0, 10.0).unwrap();
        assert!(store.intervals_of_kind(IntervalKind::Highlight).is_empty());
        assert_eq!(store.get(&strike).unwrap().duration(), 10.0);
    }

    #[test]
    fn test_clean_no_intersection_is_noop() {
        let mut store = IntervalStore::new(TimelineId::new());
        store.insert(IntervalKind::Highlight, 0.0, 1.0).unwrap();
        let before = store.clone();

        let result = store.clean(IntervalKind::Highlight, 5.0, 6.0).unwrap();
        assert!(result.is_empty());
        assert_eq!(store, before);
    }

    #[test]
    fn test_stale_plan_leaves_store_untouched() {
        let mut store = IntervalStore::new(TimelineId::new());
        let a = store.insert(IntervalKind::Highlight, 0.0, 4.0).unwrap();
        store.insert(IntervalKind::Highlight, 6.0, 10.0).unwrap();
        let plan = store.plan_clean(IntervalKind::Highlight, 2.0, 8.0).unwrap();

        store.remove(&a).unwrap();
        let before = store.clone();

        let err = store.apply_clean(&plan).unwrap_err();
        assert!(matches!(err, EngineError::IntervalNotFound(id) if id == a));
        assert_eq!(store, before);
    }

    #[test]
    fn test_restore_rejects_foreign_timeline() {
        let mut store = IntervalStore::new(TimelineId::new());
        let foreign = Interval::new(TimelineId::new(), IntervalKind::Highlight, 0.0, 1.0);
        assert!(matches!(
            store.restore(foreign),
            Err(EngineError::TimelineMismatch { .. })
        ));
    }

    #[test]
    fn test_with_intervals_and_strike_pairs() {
        let timeline = TimelineId::new();
        let records = vec![
            Interval::new(timeline, IntervalKind::Strikethrough, 8.0, 9.0),
            Interval::new(timeline, IntervalKind::Strikethrough, 2.0, 5.0),
            Interval::new(timeline, IntervalKind::Highlight, 0.0, 3.0),
        ];
        let store = IntervalStore::with_intervals(timeline, records).unwrap();
        assert_eq!(store.strike_pairs(), vec![(2.0, 5.0), (8.0, 9.0)]);
    }
}
