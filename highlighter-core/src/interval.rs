//! Interval records
//!
//! An interval marks a span of the timeline as either a highlight
//! ("keep / important") or a strikethrough ("mute / skip"). Records are
//! owned by the [`IntervalStore`](crate::store::IntervalStore) of their
//! timeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier of an interval record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalId(Uuid);

impl IntervalId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an id that was issued elsewhere (e.g. re-loaded from storage)
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for IntervalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the timeline (source video) an interval belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimelineId(Uuid);

impl TimelineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The two interval families kept per timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntervalKind {
    Highlight,
    Strikethrough,
}

impl IntervalKind {
    /// Lower-case noun used in action descriptions
    pub fn noun(&self) -> &'static str {
        match self {
            IntervalKind::Highlight => "highlight",
            IntervalKind::Strikethrough => "strikethrough",
        }
    }
}

/// A single time interval on a timeline
///
/// Invariant: `start_time < end_time`. The store never creates a record
/// that violates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub id: IntervalId,
    pub timeline_id: TimelineId,
    pub start_time: f64,
    pub end_time: f64,
    pub kind: IntervalKind,
}

impl Interval {
    /// Create a record with a fresh id. Callers are responsible for the
    /// ordering invariant; use [`IntervalStore::insert`](crate::store::IntervalStore::insert)
    /// to get normalization and validation.
    pub fn new(timeline_id: TimelineId, kind: IntervalKind, start_time: f64, end_time: f64) -> Self {
        Self {
            id: IntervalId::new(),
            timeline_id,
            start_time,
            end_time,
            kind,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// True if this interval shares a non-empty span with `[start, end]`
    pub fn intersects(&self, start: f64, end: f64) -> bool {
        self.start_time < end && self.end_time > start
    }

    /// True if `time` lies within the closed interval
    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time
    }
}

/// A mutation of the interval store, handed to the persistence collaborator
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum IntervalEvent {
    Inserted(Interval),
    Updated { before: Interval, after: Interval },
    Deleted(Interval),
}

impl IntervalEvent {
    /// Id of the record this event touches
    pub fn interval_id(&self) -> IntervalId {
        match self {
            IntervalEvent::Inserted(interval) | IntervalEvent::Deleted(interval) => interval.id,
            IntervalEvent::Updated { after, .. } => after.id,
        }
    }
}
