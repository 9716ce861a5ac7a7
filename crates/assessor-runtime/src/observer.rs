//! Callbacks fired by the attempt task.

use assessor_core::report::AttemptRecord;
use assessor_core::session::SessionView;

use crate::error::RuntimeError;

/// Receives lifecycle events from a running attempt.
///
/// Callbacks run on the attempt task, in order, and must not block.
pub trait AttemptObserver: Send + Sync {
    /// The test loaded and the clock started.
    fn on_started(&self, view: &SessionView);
    /// One second was counted. `remaining_secs` is `None` when untimed.
    fn on_tick(&self, remaining_secs: Option<u64>);
    /// Fired exactly once per attempt, for manual submission or expiry.
    fn on_submitted(&self, record: &AttemptRecord);
    /// The test could not be loaded or was rejected at start.
    fn on_load_failed(&self, error: &RuntimeError);
}

/// Observer that ignores every event.
pub struct NoopObserver;

impl AttemptObserver for NoopObserver {
    fn on_started(&self, _: &SessionView) {}
    fn on_tick(&self, _: Option<u64>) {}
    fn on_submitted(&self, _: &AttemptRecord) {}
    fn on_load_failed(&self, _: &RuntimeError) {}
}
