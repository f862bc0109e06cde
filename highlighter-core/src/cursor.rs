//! Dual cursor model
//!
//! The playhead follows playback; the navigator is moved by discrete
//! browsing (word steps, search hits, highlight jumps). While locked, the
//! navigator is defined to equal the playhead.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorPair {
    playhead: f64,
    navigator: f64,
    locked: bool,
}

impl Default for CursorPair {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl CursorPair {
    /// Both cursors at `time`, locked together
    pub fn new(time: f64) -> Self {
        Self {
            playhead: time,
            navigator: time,
            locked: true,
        }
    }

    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    /// Raw navigator position; see [`CursorPair::effective_time`]
    pub fn navigator(&self) -> f64 {
        self.navigator
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The currently relevant time: playhead if locked, navigator otherwise
    pub fn effective_time(&self) -> f64 {
        if self.locked {
            self.playhead
        } else {
            self.navigator
        }
    }

    /// Report a new playback position. Does not change the lock.
    pub fn set_playhead(&mut self, time: f64) {
        self.playhead = time;
    }

    /// Explicit navigator move; always unlocks
    pub fn move_navigator(&mut self, time: f64) {
        self.navigator = time;
        self.locked = false;
    }

    /// Re-lock the navigator to the playhead
    pub fn resync(&mut self) {
        self.navigator = self.playhead;
        self.locked = true;
    }

    /// Send the playhead to the effective time (seek playback)
    pub fn seek_to_effective(&mut self) -> f64 {
        self.playhead = self.effective_time();
        self.playhead
    }
}
