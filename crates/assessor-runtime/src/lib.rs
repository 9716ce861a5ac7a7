//! assessor-runtime — Drives a timed attempt on a tokio task.
//!
//! [`spawn_attempt`] loads the test, starts the attempt and then serializes
//! learner commands and one-second clock ticks onto a single task. Callers
//! talk to it through an [`AttemptHandle`] and watch its [`AttemptStatus`].

pub mod error;
pub mod handle;
pub mod observer;
mod task;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use assessor_core::model::TestId;
use assessor_core::session::AttemptOptions;
use assessor_core::traits::QuestionSetLoader;

pub use error::RuntimeError;
pub use handle::{AttemptHandle, AttemptStatus};
pub use observer::{AttemptObserver, NoopObserver};

const COMMAND_QUEUE_DEPTH: usize = 32;

/// Options for a spawned attempt.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    pub attempt: AttemptOptions,
    /// Real time per clock tick. One second in production.
    pub tick_interval: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            attempt: AttemptOptions::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Start an attempt on test `test_id`.
///
/// The status is `Loading` until both loader calls complete; there is no
/// load timeout. Must be called from within a tokio runtime.
pub fn spawn_attempt(
    loader: Arc<dyn QuestionSetLoader>,
    test_id: TestId,
    options: RuntimeOptions,
    observer: Arc<dyn AttemptObserver>,
) -> AttemptHandle {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
    let (status_tx, status_rx) = watch::channel(AttemptStatus::Loading);

    let task = task::AttemptTask::new(&options, command_rx, status_tx, observer);
    tokio::spawn(task.run(loader, test_id, options));

    AttemptHandle::new(command_tx, status_rx)
}
