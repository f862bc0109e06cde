//! Error types for highlighter-core.

use crate::interval::{IntervalEvent, IntervalId, TimelineId};
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Cue sequence could not be loaded (ordering violated, bad timestamp).
    #[error("malformed transcript: {message}")]
    MalformedTranscript { message: String },

    /// Zero-length or non-finite edit range after normalization.
    #[error("invalid range: [{start}, {end}]")]
    InvalidRange { start: f64, end: f64 },

    /// No interval with the given id exists in the store.
    #[error("interval not found: {0}")]
    IntervalNotFound(IntervalId),

    /// A record belonging to another timeline was handed to this store.
    #[error("timeline mismatch: expected {expected}, got {actual}")]
    TimelineMismatch {
        expected: TimelineId,
        actual: TimelineId,
    },

    /// The persistence collaborator rejected a mutation.
    ///
    /// `applied` lists the events the collaborator accepted before the
    /// failure, so the caller can reconcile remote state.
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        applied: Vec<IntervalEvent>,
    },

    /// I/O error while reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        EngineError::MalformedTranscript {
            message: message.into(),
        }
    }
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;
