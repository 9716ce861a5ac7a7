//! Client side of a running attempt.

use tokio::sync::{mpsc, oneshot, watch};

use assessor_core::error::SessionError;
use assessor_core::model::QuestionId;
use assessor_core::report::AttemptRecord;
use assessor_core::session::{SessionView, Submission};

use crate::error::RuntimeError;

/// Observable state of an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    /// Waiting for the loader.
    Loading,
    InProgress(SessionView),
    Submitted(AttemptRecord),
    /// Loading failed or the test was rejected.
    Failed(String),
    /// Cancelled before submission.
    Abandoned,
}

impl AttemptStatus {
    /// No further status change will follow.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptStatus::Submitted(_) | AttemptStatus::Failed(_) | AttemptStatus::Abandoned
        )
    }

    pub fn view(&self) -> Option<&SessionView> {
        match self {
            AttemptStatus::InProgress(view) => Some(view),
            _ => None,
        }
    }

    pub fn record(&self) -> Option<&AttemptRecord> {
        match self {
            AttemptStatus::Submitted(record) => Some(record),
            _ => None,
        }
    }
}

pub(crate) type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    Next,
    Previous,
    To(usize),
}

pub(crate) enum Command {
    Answer {
        /// `None` targets the question under the cursor.
        question: Option<QuestionId>,
        option: usize,
        reply: Reply<Option<usize>>,
    },
    Move {
        to: Move,
        reply: Reply<usize>,
    },
    Submit {
        reply: Reply<Submission>,
    },
    Abandon {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to an attempt running on its own task.
///
/// Commands are queued and applied in order. Cloning is cheap; the task is
/// abandoned once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct AttemptHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<AttemptStatus>,
}

impl AttemptHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<Command>,
        status: watch::Receiver<AttemptStatus>,
    ) -> Self {
        Self { commands, status }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(rx.await.map_err(|_| RuntimeError::Stopped)??)
    }

    /// Select `option` for `question`. Returns the previous selection.
    pub async fn answer(
        &self,
        question: QuestionId,
        option: usize,
    ) -> Result<Option<usize>, RuntimeError> {
        self.request(|reply| Command::Answer {
            question: Some(question),
            option,
            reply,
        })
        .await
    }

    /// Select `option` for the question under the cursor.
    pub async fn answer_current(&self, option: usize) -> Result<Option<usize>, RuntimeError> {
        self.request(|reply| Command::Answer {
            question: None,
            option,
            reply,
        })
        .await
    }

    pub async fn go_next(&self) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Move {
            to: Move::Next,
            reply,
        })
        .await
    }

    pub async fn go_previous(&self) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Move {
            to: Move::Previous,
            reply,
        })
        .await
    }

    pub async fn go_to(&self, index: usize) -> Result<usize, RuntimeError> {
        self.request(|reply| Command::Move {
            to: Move::To(index),
            reply,
        })
        .await
    }

    pub async fn submit(&self) -> Result<Submission, RuntimeError> {
        self.request(|reply| Command::Submit { reply }).await
    }

    /// Stop the attempt without submitting. Ending an already finished
    /// attempt is not an error.
    pub async fn abandon(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Abandon { reply: tx }).await.is_err() {
            return Ok(());
        }
        let _ = rx.await;
        Ok(())
    }

    /// Latest published status.
    pub fn status(&self) -> AttemptStatus {
        self.status.borrow().clone()
    }

    /// A receiver notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<AttemptStatus> {
        self.status.clone()
    }

    /// Wait until the attempt is submitted, fails or is abandoned.
    pub async fn wait_for_completion(&self) -> AttemptStatus {
        let mut status = self.status.clone();
        if let Ok(done) = status.wait_for(AttemptStatus::is_terminal).await {
            return done.clone();
        }
        // Task gone without a terminal status.
        let last = status.borrow().clone();
        last
    }
}
