//! Runtime error type.

use thiserror::Error;

use assessor_core::error::{LoadError, SessionError};

/// Errors returned through an [`crate::AttemptHandle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("failed to load test: {0}")]
    Load(#[from] LoadError),

    /// The task owning the attempt has ended.
    #[error("attempt task has stopped")]
    Stopped,
}

impl RuntimeError {
    /// A late command against an already submitted attempt.
    pub fn is_benign(&self) -> bool {
        matches!(self, RuntimeError::Session(e) if e.is_benign())
    }
}
