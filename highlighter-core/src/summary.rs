//! Highlight summaries and navigation
//!
//! Read-only views over the highlight collection: per-highlight duration
//! figures, which highlights are active at a time, and jumping between
//! highlights.

use crate::interval::{Interval, IntervalKind};
use crate::relative_time::clipped_relative_duration;
use crate::store::IntervalStore;
use serde::Serialize;

/// Duration figures for one highlight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightSummary {
    pub interval: Interval,

    /// `end - start`
    pub absolute_duration: f64,

    /// Duration with intersecting strikes removed (overlaps counted once)
    pub relative_duration: f64,

    /// Number of strike records intersecting the highlight
    pub strike_count: usize,
}

/// Summaries for every highlight, ordered by start time
pub fn highlight_summaries(store: &IntervalStore) -> Vec<HighlightSummary> {
    let strikes = store.strike_pairs();

    store
        .intervals_of_kind(IntervalKind::Highlight)
        .into_iter()
        .map(|highlight| {
            let (start, end) = (highlight.start_time, highlight.end_time);
            HighlightSummary {
                interval: highlight.clone(),
                absolute_duration: highlight.duration(),
                relative_duration: clipped_relative_duration(start, end, &strikes),
                strike_count: strikes.iter().filter(|&&(s, e)| s < end && e > start).count(),
            }
        })
        .collect()
}

/// Highlights covering `time` (bounds inclusive)
pub fn active_highlights(store: &IntervalStore, time: f64) -> Vec<&Interval> {
    store
        .intervals_of_kind(IntervalKind::Highlight)
        .into_iter()
        .filter(|h| h.contains_time(time))
        .collect()
}

/// First highlight starting more than `epsilon` after `time`
pub fn next_highlight(store: &IntervalStore, time: f64, epsilon: f64) -> Option<&Interval> {
    store
        .intervals_of_kind(IntervalKind::Highlight)
        .into_iter()
        .find(|h| h.start_time > time + epsilon)
}

/// Last highlight starting more than `epsilon` before `time`
pub fn previous_highlight(store: &IntervalStore, time: f64, epsilon: f64) -> Option<&Interval> {
    store
        .intervals_of_kind(IntervalKind::Highlight)
        .into_iter()
        .rev()
        .find(|h| h.start_time < time - epsilon)
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up
///
/// Fractions are truncated; negative or non-finite input formats as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
