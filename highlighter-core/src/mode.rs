//! Selection mode state machine
//!
//! Tracks which pending range operation is active and where it was
//! anchored. At most one mode is pending at a time; beginning another mode
//! discards the previous one without committing it.

use crate::interval::IntervalKind;
use serde::{Deserialize, Serialize};

/// The four range operations a selection can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeKind {
    /// Insert a highlight
    Highlight,
    /// Insert a strikethrough
    Strikethrough,
    /// Remove strikethrough coverage
    Clean,
    /// Remove highlight coverage
    ClearHighlight,
}

impl ModeKind {
    /// The interval family this mode inserts into or cleans from
    pub fn interval_kind(&self) -> IntervalKind {
        match self {
            ModeKind::Highlight | ModeKind::ClearHighlight => IntervalKind::Highlight,
            ModeKind::Strikethrough | ModeKind::Clean => IntervalKind::Strikethrough,
        }
    }

    /// True for modes that add a record, false for modes that clean
    pub fn inserts(&self) -> bool {
        matches!(self, ModeKind::Highlight | ModeKind::Strikethrough)
    }

    /// True for modes that edit mute ranges (refused in relative display mode)
    pub fn edits_strikes(&self) -> bool {
        self.interval_kind() == IntervalKind::Strikethrough
    }

    pub fn label(&self) -> &'static str {
        match self {
            ModeKind::Highlight => "Highlight",
            ModeKind::Strikethrough => "Strikethrough",
            ModeKind::Clean => "Clean",
            ModeKind::ClearHighlight => "Clear highlight",
        }
    }
}

/// Current state of the selection
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    /// No operation pending
    #[default]
    Idle,

    /// An operation was begun at `anchor` and awaits its second endpoint
    Pending { mode: ModeKind, anchor: f64 },
}

/// A completed selection, normalized so `start <= end`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditRequest {
    pub mode: ModeKind,
    pub start: f64,
    pub end: f64,
}

/// What a call to [`SelectionMode::begin`] did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// A new selection was anchored; `replaced` is the mode it discarded
    Started {
        mode: ModeKind,
        anchor: f64,
        replaced: Option<ModeKind>,
    },
    /// The same mode was begun again, completing the selection
    Committed(EditRequest),
}

#[derive(Debug, Clone, Default)]
pub struct SelectionMode {
    state: SelectionState,
}

impl SelectionMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// Pending mode and its anchor, if any
    pub fn pending(&self) -> Option<(ModeKind, f64)> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Pending { mode, anchor } => Some((mode, anchor)),
        }
    }

    pub fn is_pending(&self, mode: ModeKind) -> bool {
        matches!(self.state, SelectionState::Pending { mode: m, .. } if m == mode)
    }

    /// Start `mode` at `effective_time`, or commit it if it is already pending
    ///
    /// Any other pending mode is dropped without committing.
    pub fn begin(&mut self, mode: ModeKind, effective_time: f64) -> Transition {
        match self.state {
            SelectionState::Pending { mode: current, anchor } if current == mode => {
                self.state = SelectionState::Idle;
                Transition::Committed(request(mode, anchor, effective_time))
            }
            previous => {
                let replaced = match previous {
                    SelectionState::Pending { mode, .. } => Some(mode),
                    SelectionState::Idle => None,
                };
                self.state = SelectionState::Pending {
                    mode,
                    anchor: effective_time,
                };
                Transition::Started {
                    mode,
                    anchor: effective_time,
                    replaced,
                }
            }
        }
    }

    /// Complete the pending selection at `effective_time`
    ///
    /// Returns `None` (and stays idle) if nothing was pending.
    pub fn commit(&mut self, effective_time: f64) -> Option<EditRequest> {
        let (mode, anchor) = self.pending()?;
        self.state = SelectionState::Idle;
        Some(request(mode, anchor, effective_time))
    }

    /// Drop the pending selection; returns the mode that was discarded
    pub fn cancel(&mut self) -> Option<ModeKind> {
        let (mode, _) = self.pending()?;
        self.state = SelectionState::Idle;
        Some(mode)
    }

    /// Range the pending selection would cover if committed now (for rendering)
    pub fn preview_range(&self, effective_time: f64) -> Option<(ModeKind, f64, f64)> {
        self.pending().map(|(mode, anchor)| {
            (mode, anchor.min(effective_time), anchor.max(effective_time))
        })
    }
}

fn request(mode: ModeKind, anchor: f64, effective_time: f64) -> EditRequest {
    EditRequest {
        mode,
        start: anchor.min(effective_time),
        end: anchor.max(effective_time),
    }
}
