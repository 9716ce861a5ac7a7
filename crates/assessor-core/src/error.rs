//! Error types for the session engine and loaders.
//!
//! `LoadError` lives here rather than in `assessor-loader` so the runtime can
//! classify load failures without depending on a concrete loader.

use thiserror::Error;

use crate::model::QuestionId;

/// Errors returned by attempt operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A cursor or option index outside `[0, len)`.
    #[error("index {index} out of range (0..{len})")]
    OutOfRange { index: usize, len: usize },

    /// The question is not part of this attempt.
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// The attempt has already been submitted.
    #[error("session closed")]
    SessionClosed,

    /// The test has not finished loading.
    #[error("session not started")]
    NotStarted,

    /// The attempt was already started.
    #[error("session already started")]
    AlreadyStarted,

    /// The loaded test failed validation.
    #[error("invalid test: {0}")]
    Invalid(#[from] ValidationError),
}

impl SessionError {
    /// Returns `true` for errors that only signal a late event after
    /// submission. Callers may drop these silently.
    pub fn is_benign(&self) -> bool {
        matches!(self, SessionError::SessionClosed)
    }
}

/// Reasons a test and its questions are rejected at start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("test has no questions")]
    EmptyQuestionSet,

    #[error("passing score must be between 1 and 100, got {0}")]
    PassingScoreOutOfRange(u8),

    #[error("duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} has no answer options")]
    NoOptions(QuestionId),

    #[error("question {question} must have exactly one correct option, found {count}")]
    CorrectOptionCount { question: QuestionId, count: usize },
}

/// Errors that can occur when fetching a test from a loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The loader has no such test.
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },

    /// The loader returned data that could not be interpreted.
    #[error("malformed test data: {0}")]
    Malformed(String),

    /// The loader could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl LoadError {
    pub fn test_not_found(id: impl ToString) -> Self {
        LoadError::NotFound {
            what: "test",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }
}
