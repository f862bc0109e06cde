// Highlighter Core Library
// Interval annotation engine for word-aligned video transcripts

pub mod error;
pub mod interval;
pub mod cue;
pub mod vtt;
pub mod store;
pub mod relative_time;
pub mod cursor;
pub mod mode;
pub mod action;
pub mod actions;
pub mod summary;
pub mod config;
pub mod session;

mod proptest;

pub use action::{Action, ActionExecutor, IntervalBackend, NullBackend, RedoOutcome, UndoOutcome};
pub use config::EngineConfig;
pub use cue::{Cue, CueIndex};
pub use cursor::CursorPair;
pub use error::{EngineError, Result};
pub use interval::{Interval, IntervalEvent, IntervalId, IntervalKind, TimelineId};
pub use mode::{EditRequest, ModeKind, SelectionMode, SelectionState, Transition};
pub use session::{Command, Notice, NoticeLevel, Outcome, Session};
pub use store::{CleanResult, IntervalStore};
pub use summary::HighlightSummary;
