//! Editing session and command dispatch
//!
//! A [`Session`] ties together everything one open transcript needs: the cue
//! index, the interval store behind its undo history, the dual cursor, the
//! pending selection and the relative-mode display flag. Callers feed it
//! [`Command`]s and render the returned [`Outcome`]s.

use crate::action::{ActionExecutor, IntervalBackend, NullBackend, RedoOutcome, UndoOutcome};
use crate::actions::{CleanIntervalsAction, DeleteIntervalAction, InsertIntervalAction, InsertIntervalsAction};
use crate::config::EngineConfig;
use crate::cue::CueIndex;
use crate::cursor::CursorPair;
use crate::error::{EngineError, Result};
use crate::interval::{IntervalEvent, IntervalId, IntervalKind, TimelineId};
use crate::mode::{EditRequest, ModeKind, SelectionMode, Transition};
use crate::relative_time::{merge_intervals, relative_duration, skip_target, to_absolute, to_relative};
use crate::store::IntervalStore;
use crate::summary::{next_highlight, previous_highlight};
use serde::Serialize;

const STRIKE_LOCKED_MESSAGE: &str = "Strikethrough editing is disabled in Relative Mode";

/// Input to [`Session::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Begin a selection at the effective time (commits if already pending)
    Begin(ModeKind),
    Commit,
    Cancel,
    Undo,
    Redo,
    /// Step the navigator by whole cues; zero leaves it in place
    MoveWords(i32),
    MoveNavigatorTo(f64),
    /// Playback reported a new position
    SetPlayhead(f64),
    /// Lock the navigator back onto the playhead
    Resync,
    /// Seek playback to the effective time
    SeekToNavigator,
    ToggleRelativeMode,
    NextHighlight,
    PreviousHighlight,
    StrikeLongPauses,
    DeleteInterval(IntervalId),
    Search(String),
    NextSearchResult,
    PreviousSearchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// User-facing message produced by a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Result of a dispatched command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub notice: Option<Notice>,

    /// Store mutations, in the order they were applied
    pub events: Vec<IntervalEvent>,

    /// Where playback should jump, if anywhere
    pub seek: Option<f64>,
}

impl Outcome {
    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Default::default()
        }
    }

    fn seek(time: f64) -> Self {
        Self {
            seek: Some(time),
            ..Default::default()
        }
    }
}

/// Active search and the hit the navigator is on
#[derive(Debug, Clone, PartialEq)]
struct SearchState {
    hits: Vec<usize>,
    current: usize,
}

/// One open transcript with its annotations
pub struct Session {
    cues: CueIndex,
    executor: ActionExecutor,
    cursor: CursorPair,
    selection: SelectionMode,
    config: EngineConfig,
    relative_mode: bool,
    search: Option<SearchState>,
}

impl Session {
    /// Session over an empty store for `timeline_id`
    pub fn new(cues: CueIndex, timeline_id: TimelineId, config: EngineConfig) -> Self {
        Self::with_store(cues, IntervalStore::new(timeline_id), config)
    }

    /// Session over previously persisted records
    pub fn with_store(cues: CueIndex, store: IntervalStore, config: EngineConfig) -> Self {
        let mut executor = ActionExecutor::new(store);
        executor.set_max_undo_depth(config.max_undo_depth);

        Self {
            cues,
            executor,
            cursor: CursorPair::default(),
            selection: SelectionMode::new(),
            config,
            relative_mode: false,
            search: None,
        }
    }

    pub fn cues(&self) -> &CueIndex {
        &self.cues
    }

    pub fn store(&self) -> &IntervalStore {
        self.executor.store()
    }

    pub fn executor(&self) -> &ActionExecutor {
        &self.executor
    }

    pub fn cursor(&self) -> &CursorPair {
        &self.cursor
    }

    pub fn selection(&self) -> &SelectionMode {
        &self.selection
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_relative_mode(&self) -> bool {
        self.relative_mode
    }

    /// Search hits for the last query (cue indices)
    pub fn search_hits(&self) -> &[usize] {
        self.search.as_ref().map(|s| s.hits.as_slice()).unwrap_or(&[])
    }

    /// Disjoint cover of all strikes, used for every relative-time figure
    pub fn merged_strikes(&self) -> Vec<(f64, f64)> {
        merge_intervals(&self.executor.store().strike_pairs())
    }

    /// Absolute `time` expressed in relative time
    pub fn relative_time(&self, time: f64) -> f64 {
        to_relative(time, &self.merged_strikes())
    }

    /// Relative `time` mapped back to absolute time
    pub fn absolute_time(&self, relative: f64) -> f64 {
        to_absolute(relative, &self.merged_strikes())
    }

    /// Length of the transcript with muted spans removed
    pub fn relative_total_duration(&self) -> f64 {
        relative_duration(0.0, self.cues.total_duration(), &self.merged_strikes())
    }

    /// Cue under the effective cursor
    pub fn current_cue(&self) -> Option<usize> {
        self.cues.cue_at(self.cursor.effective_time())
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        self.dispatch_with_backend(command, &mut NullBackend)
    }

    /// Dispatch a command, forwarding any store mutation to `backend`
    ///
    /// A backend rejection is returned as `EngineError::Persistence` after
    /// the local change has been reverted.
    pub fn dispatch_with_backend(
        &mut self,
        command: Command,
        backend: &mut dyn IntervalBackend,
    ) -> Result<Outcome> {
        log::debug!("dispatch {:?}", command);

        match command {
            Command::Begin(mode) => self.begin(mode, backend),
            Command::Commit => {
                let time = self.cursor.effective_time();
                match self.selection.commit(time) {
                    Some(request) => self.apply_edit(request, backend),
                    None => Ok(Outcome::default()),
                }
            }
            Command::Cancel => Ok(match self.selection.cancel() {
                Some(mode) => {
                    log::debug!("{} selection canceled", mode.label());
                    Outcome::notice(Notice::info("Selection canceled"))
                }
                None => Outcome::default(),
            }),
            Command::Undo => self.undo(backend),
            Command::Redo => self.redo(backend),
            Command::MoveWords(delta) => {
                if let Some(index) = self.word_target(delta) {
                    if let Some(time) = self.cues.time_of(index) {
                        self.cursor.move_navigator(time);
                    }
                }
                Ok(Outcome::default())
            }
            Command::MoveNavigatorTo(time) => {
                self.cursor.move_navigator(time);
                Ok(Outcome::default())
            }
            Command::SetPlayhead(time) => Ok(self.set_playhead(time)),
            Command::Resync => {
                self.cursor.resync();
                Ok(Outcome::default())
            }
            Command::SeekToNavigator => Ok(Outcome::seek(self.cursor.seek_to_effective())),
            Command::ToggleRelativeMode => {
                self.relative_mode = !self.relative_mode;
                log::info!("Relative mode {}", if self.relative_mode { "on" } else { "off" });
                Ok(Outcome::default())
            }
            Command::NextHighlight => {
                let (time, epsilon) = (self.cursor.effective_time(), self.config.highlight_nav_epsilon);
                let target = next_highlight(self.executor.store(), time, epsilon).map(|h| h.start_time);
                Ok(target.map_or_else(Outcome::default, |start| self.jump_to(start)))
            }
            Command::PreviousHighlight => {
                let (time, epsilon) = (self.cursor.effective_time(), self.config.highlight_nav_epsilon);
                let target = previous_highlight(self.executor.store(), time, epsilon).map(|h| h.start_time);
                Ok(target.map_or_else(Outcome::default, |start| self.jump_to(start)))
            }
            Command::StrikeLongPauses => self.strike_long_pauses(backend),
            Command::DeleteInterval(id) => self.delete_interval(id, backend),
            Command::Search(query) => Ok(self.search(&query)),
            Command::NextSearchResult => Ok(self.step_search(1)),
            Command::PreviousSearchResult => Ok(self.step_search(-1)),
        }
    }

    fn begin(&mut self, mode: ModeKind, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        if mode.edits_strikes() && self.relative_mode {
            log::info!("Refused {} in relative mode", mode.label());
            return Ok(Outcome::notice(Notice::error(STRIKE_LOCKED_MESSAGE)));
        }

        match self.selection.begin(mode, self.cursor.effective_time()) {
            Transition::Started { anchor, replaced, .. } => {
                if let Some(replaced) = replaced {
                    log::debug!("{} selection replaced by {}", replaced.label(), mode.label());
                }
                log::debug!("{} anchored at {}", mode.label(), anchor);
                Ok(Outcome::default())
            }
            Transition::Committed(request) => self.apply_edit(request, backend),
        }
    }

    /// Turn a completed selection into an insert or clean
    fn apply_edit(&mut self, request: EditRequest, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        if request.mode.edits_strikes() && self.relative_mode {
            log::info!("Refused {} commit in relative mode", request.mode.label());
            return Ok(Outcome::notice(Notice::error(STRIKE_LOCKED_MESSAGE)));
        }

        let (start, end) = self.snapped(request);
        let kind = request.mode.interval_kind();

        let result = if request.mode.inserts() {
            self.executor
                .execute_with_backend(Box::new(InsertIntervalAction::new(kind, start, end)), backend)
        } else {
            self.executor
                .execute_with_backend(Box::new(CleanIntervalsAction::new(kind, start, end)), backend)
        };

        let events = match result {
            Ok(events) => events,
            Err(EngineError::InvalidRange { start, end }) => {
                log::debug!("Ignoring empty selection [{}, {}]", start, end);
                return Ok(Outcome::default());
            }
            Err(err) => return Err(err),
        };

        if events.is_empty() {
            return Ok(Outcome::default());
        }

        let message = match (request.mode.inserts(), kind) {
            (true, IntervalKind::Highlight) => "Highlight saved",
            (true, IntervalKind::Strikethrough) => "Strikethrough updated",
            (false, IntervalKind::Highlight) => "Highlights cleared",
            (false, IntervalKind::Strikethrough) => "Strikethroughs removed",
        };
        let notice = if request.mode.inserts() {
            Notice::success(message)
        } else {
            Notice::info(message)
        };

        Ok(Outcome {
            notice: Some(notice),
            events,
            seek: None,
        })
    }

    /// Widen a request to the cue under the cursor when snapping is enabled
    fn snapped(&self, request: EditRequest) -> (f64, f64) {
        if !self.config.snap_to_cue {
            return (request.start, request.end);
        }
        match self.current_cue().and_then(|i| self.cues.get(i)) {
            Some(cue) => (request.start.min(cue.start_time), request.end.max(cue.end_time)),
            None => (request.start, request.end),
        }
    }

    fn undo(&mut self, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        match self.executor.undo_with_backend(backend)? {
            UndoOutcome::Undone {
                description,
                events,
            } => Ok(Outcome {
                notice: Some(Notice::success(format!("Undone: {}", description))),
                events,
                seek: None,
            }),
            UndoOutcome::NothingToUndo => Ok(Outcome::notice(Notice::info("Nothing to undo"))),
        }
    }

    fn redo(&mut self, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        match self.executor.redo_with_backend(backend)? {
            RedoOutcome::Redone {
                description,
                events,
            } => Ok(Outcome {
                notice: Some(Notice::success(format!("Redone: {}", description))),
                events,
                seek: None,
            }),
            RedoOutcome::NothingToRedo => Ok(Outcome::notice(Notice::info("Nothing to redo"))),
        }
    }

    /// Cue index `delta` words away from the effective cursor
    ///
    /// Inside a cue, steps from that cue. In a gap, the cursor sits between
    /// the preceding cue and the next one. Before the first cue, the first
    /// forward step lands on cue 0.
    fn word_target(&self, delta: i32) -> Option<usize> {
        if delta == 0 || self.cues.is_empty() {
            return None;
        }
        let time = self.cursor.effective_time();

        let target = match (self.cues.cue_at(time), self.cues.cue_at_or_before(time)) {
            (Some(index), _) => self.cues.move_by_words(index, delta),
            (None, Some(before)) if delta <= 0 => self.cues.move_by_words(before, delta + 1),
            (None, Some(before)) => self.cues.move_by_words(before, delta),
            (None, None) => self.cues.move_by_words(0, (delta - 1).max(0)),
        };
        Some(target)
    }

    fn set_playhead(&mut self, time: f64) -> Outcome {
        self.cursor.set_playhead(time);
        if !self.relative_mode {
            return Outcome::default();
        }

        match skip_target(time, &self.merged_strikes()) {
            Some(end) => {
                log::debug!("Skipping muted span: {} -> {}", time, end);
                self.cursor.set_playhead(end);
                Outcome::seek(end)
            }
            None => Outcome::default(),
        }
    }

    /// Move the navigator to `time` and seek playback there
    fn jump_to(&mut self, time: f64) -> Outcome {
        self.cursor.move_navigator(time);
        Outcome::seek(self.cursor.seek_to_effective())
    }

    fn strike_long_pauses(&mut self, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        if self.relative_mode {
            return Ok(Outcome::notice(Notice::error(STRIKE_LOCKED_MESSAGE)));
        }

        let min_blanks = self.config.long_pause_min_blanks;
        let pauses = self.cues.long_pauses(min_blanks, &self.config.blank_marker);
        if pauses.is_empty() {
            return Ok(Outcome::notice(Notice::info(format!(
                "No long pauses found ({}+ blanks)",
                min_blanks
            ))));
        }

        let existing = self.executor.store().strike_pairs();
        let fresh: Vec<(f64, f64)> = pauses
            .into_iter()
            .filter(|&(start, end)| {
                !existing.iter().any(|&(s, e)| {
                    (start >= s && start < e) || (end > s && end <= e) || (start <= s && end >= e)
                })
            })
            .collect();
        if fresh.is_empty() {
            return Ok(Outcome::notice(Notice::info(
                "All long pauses are already struck through",
            )));
        }

        let count = fresh.len();
        let action = InsertIntervalsAction::new(IntervalKind::Strikethrough, fresh, "Strike long pauses");
        let events = self.executor.execute_with_backend(Box::new(action), backend)?;
        log::info!("Struck through {} long pauses", count);

        Ok(Outcome {
            notice: Some(Notice::success(format!("Struck through {} long pauses", count))),
            events,
            seek: None,
        })
    }

    fn delete_interval(&mut self, id: IntervalId, backend: &mut dyn IntervalBackend) -> Result<Outcome> {
        let kind = self
            .executor
            .store()
            .get(&id)
            .map(|interval| interval.kind)
            .ok_or(EngineError::IntervalNotFound(id))?;

        if kind == IntervalKind::Strikethrough && self.relative_mode {
            return Ok(Outcome::notice(Notice::error(STRIKE_LOCKED_MESSAGE)));
        }

        let events = self
            .executor
            .execute_with_backend(Box::new(DeleteIntervalAction::new(id)), backend)?;
        let message = match kind {
            IntervalKind::Highlight => "Highlight deleted",
            IntervalKind::Strikethrough => "Strikethrough deleted",
        };

        Ok(Outcome {
            notice: Some(Notice::success(message)),
            events,
            seek: None,
        })
    }

    fn search(&mut self, query: &str) -> Outcome {
        let hits = self.cues.search(query);
        if hits.is_empty() {
            self.search = None;
            return if query.is_empty() {
                Outcome::default()
            } else {
                Outcome::notice(Notice::info(format!("No matches for \"{}\"", query)))
            };
        }

        self.search = Some(SearchState { hits, current: 0 });
        self.move_to_search_hit()
    }

    /// Cycle through search hits, wrapping at either end
    fn step_search(&mut self, delta: i64) -> Outcome {
        let Some(search) = self.search.as_mut() else {
            return Outcome::default();
        };
        let len = search.hits.len() as i64;
        search.current = (search.current as i64 + delta).rem_euclid(len) as usize;
        self.move_to_search_hit()
    }

    fn move_to_search_hit(&mut self) -> Outcome {
        let time = self
            .search
            .as_ref()
            .and_then(|s| s.hits.get(s.current))
            .and_then(|&index| self.cues.time_of(index));
        if let Some(time) = time {
            self.cursor.move_navigator(time);
        }
        Outcome::default()
    }
}
