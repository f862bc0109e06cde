//! Word-level cue index
//!
//! A transcript is loaded once per timeline as an ordered sequence of
//! time-stamped tokens (words, or blank markers for pauses). The position of
//! a cue in that sequence is the "word index" used for navigation.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// A single time-stamped transcript token
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cue {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

impl Cue {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// True if this cue marks silence rather than a spoken word
    pub fn is_blank(&self, marker: &str) -> bool {
        self.text.trim().is_empty() || self.text == marker
    }

    /// How many pause units a blank cue stands for
    ///
    /// Each space counts as one blank, with a minimum of one.
    fn blank_count(&self) -> usize {
        self.text.matches(' ').count().max(1)
    }
}

/// Ordered, immutable sequence of cues
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CueIndex {
    cues: Vec<Cue>,
}

impl CueIndex {
    /// Validate and index a cue sequence
    ///
    /// Start times must be finite and non-decreasing. No partial index is
    /// produced on failure.
    pub fn load(cues: Vec<Cue>) -> Result<Self> {
        for (i, cue) in cues.iter().enumerate() {
            if !cue.start_time.is_finite() || !cue.end_time.is_finite() {
                return Err(EngineError::malformed(format!(
                    "cue {} has a non-finite time",
                    i
                )));
            }
            if i > 0 && cue.start_time < cues[i - 1].start_time {
                return Err(EngineError::malformed(format!(
                    "cue {} starts at {} before cue {} at {}",
                    i,
                    cue.start_time,
                    i - 1,
                    cues[i - 1].start_time
                )));
            }
        }
        log::debug!("Loaded {} cues", cues.len());
        Ok(Self { cues })
    }

    /// Parse a WebVTT document and index its cues
    pub fn from_vtt(content: &str) -> Result<Self> {
        Self::load(crate::vtt::parse_vtt(content)?)
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cue> {
        self.cues.get(index)
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Start time of the cue at `index`
    pub fn time_of(&self, index: usize) -> Option<f64> {
        self.cues.get(index).map(|c| c.start_time)
    }

    /// Index of the cue with `start <= time < end`, if any
    ///
    /// Returns `None` for times in a gap or outside the transcript.
    pub fn cue_at(&self, time: f64) -> Option<usize> {
        let index = self.cue_at_or_before(time)?;
        (time < self.cues[index].end_time).then_some(index)
    }

    /// Index of the last cue starting at or before `time`
    pub fn cue_at_or_before(&self, time: f64) -> Option<usize> {
        self.cues
            .partition_point(|c| c.start_time <= time)
            .checked_sub(1)
    }

    /// Move `delta` words from `from`, clamped to the transcript
    ///
    /// Does not wrap. An empty index always yields 0.
    pub fn move_by_words(&self, from: usize, delta: i32) -> usize {
        if self.cues.is_empty() {
            return 0;
        }
        let last = self.cues.len() as i64 - 1;
        (from as i64 + delta as i64).clamp(0, last) as usize
    }

    /// End time of the last cue, or 0 for an empty transcript
    pub fn total_duration(&self) -> f64 {
        self.cues.last().map_or(0.0, |c| c.end_time)
    }

    /// Indices of cues whose text contains `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<usize> {
        if query.is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.cues
            .iter()
            .enumerate()
            .filter(|(_, cue)| cue.text.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    /// Spans of consecutive blank cues worth at least `min_blanks` pause units
    pub fn long_pauses(&self, min_blanks: usize, marker: &str) -> Vec<(f64, f64)> {
        let mut pauses = Vec::new();
        // (start, end, blank units)
        let mut current: Option<(f64, f64, usize)> = None;

        for cue in &self.cues {
            if cue.is_blank(marker) {
                current = Some(match current {
                    Some((start, _, count)) => (start, cue.end_time, count + cue.blank_count()),
                    None => (cue.start_time, cue.end_time, cue.blank_count()),
                });
            } else if let Some((start, end, count)) = current.take() {
                if count >= min_blanks {
                    pauses.push((start, end));
                }
            }
        }
        if let Some((start, end, count)) = current {
            if count >= min_blanks {
                pauses.push((start, end));
            }
        }

        pauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> CueIndex {
        CueIndex::load(vec![
            Cue::new(0.0, 1.0, "a"),
            Cue::new(1.0, 2.0, "b"),
            Cue::new(2.5, 3.0, "c"),
        ])
        .unwrap()
    }

    #[test]
    fn test_load_rejects_out_of_order() {
        let err = CueIndex::load(vec![Cue::new(1.0, 2.0, "b"), Cue::new(0.0, 1.0, "a")]).unwrap_err();
        assert!(matches!(err, EngineError::MalformedTranscript { .. }));

        let err = CueIndex::load(vec![Cue::new(f64::NAN, 1.0, "a")]).unwrap_err();
        assert!(matches!(err, EngineError::MalformedTranscript { .. }));
    }

    #[test]
    fn test_load_accepts_equal_starts() {
        let index = CueIndex::load(vec![Cue::new(1.0, 1.0, ""), Cue::new(1.0, 2.0, "b")]).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.cue_at(1.5), Some(1));
    }

    #[test]
    fn test_cue_at() {
        let index = abc();
        assert_eq!(index.cue_at(0.0), Some(0));
        assert_eq!(index.cue_at(0.99), Some(0));
        assert_eq!(index.cue_at(1.0), Some(1));
        // Gap between b and c
        assert_eq!(index.cue_at(2.2), None);
        assert_eq!(index.cue_at(2.5), Some(2));
        // End is exclusive
        assert_eq!(index.cue_at(3.0), None);
        assert_eq!(index.cue_at(-1.0), None);
    }

    #[test]
    fn test_cue_at_or_before() {
        let index = abc();
        assert_eq!(index.cue_at_or_before(2.2), Some(1));
        assert_eq!(index.cue_at_or_before(10.0), Some(2));
        assert_eq!(index.cue_at_or_before(-0.5), None);
    }

    #[test]
    fn test_move_by_words_clamps() {
        let index = abc();
        assert_eq!(index.move_by_words(0, 1), 1);
        assert_eq!(index.move_by_words(0, -1), 0);
        assert_eq!(index.move_by_words(1, 10), 2);
        assert_eq!(index.move_by_words(2, -10), 0);
        assert_eq!(CueIndex::default().move_by_words(0, 3), 0);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let index = CueIndex::load(vec![
            Cue::new(0.0, 1.0, "Hello"),
            Cue::new(1.0, 2.0, "world"),
            Cue::new(2.0, 3.0, "HELLO again"),
        ])
        .unwrap();
        assert_eq!(index.search("hello"), vec![0, 2]);
        assert!(index.search("").is_empty());
        assert!(index.search("nope").is_empty());
    }

    #[test]
    fn test_long_pauses() {
        let index = CueIndex::load(vec![
            Cue::new(0.0, 1.0, "word"),
            Cue::new(1.0, 2.0, ""),
            Cue::new(2.0, 3.0, "BLANK"),
            Cue::new(3.0, 4.0, " "),
            Cue::new(4.0, 5.0, "word"),
            Cue::new(5.0, 6.0, "  "),
            Cue::new(6.0, 7.0, "word"),
            // Three spaces count as three blanks on their own
            Cue::new(7.0, 8.0, "   "),
        ])
        .unwrap();

        assert_eq!(index.long_pauses(3, "BLANK"), vec![(1.0, 4.0), (7.0, 8.0)]);
        assert_eq!(
            index.long_pauses(2, "BLANK"),
            vec![(1.0, 4.0), (5.0, 6.0), (7.0, 8.0)]
        );
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(abc().total_duration(), 3.0);
        assert_eq!(CueIndex::default().total_duration(), 0.0);
    }
}
