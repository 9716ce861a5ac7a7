//! The task that owns an attempt.
//!
//! Every mutation of the attempt happens here, one event at a time: a queued
//! command, load completion, or a clock tick. Ticks are only polled while the
//! attempt is in progress, so none can arrive after submission.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use assessor_core::clock::Tick;
use assessor_core::error::SessionError;
use assessor_core::model::{Question, TestDefinition, TestId};
use assessor_core::report::AttemptRecord;
use assessor_core::session::{Attempt, Phase, Submission};
use assessor_core::traits::QuestionSetLoader;

use crate::error::RuntimeError;
use crate::handle::{AttemptStatus, Command, Move};
use crate::observer::AttemptObserver;
use crate::RuntimeOptions;

enum Flow {
    Continue,
    Stop,
}

pub(crate) struct AttemptTask {
    attempt: Attempt,
    commands: mpsc::Receiver<Command>,
    status: watch::Sender<AttemptStatus>,
    observer: Arc<dyn AttemptObserver>,
    started_at: Option<DateTime<Utc>>,
}

impl AttemptTask {
    pub(crate) fn new(
        options: &RuntimeOptions,
        commands: mpsc::Receiver<Command>,
        status: watch::Sender<AttemptStatus>,
        observer: Arc<dyn AttemptObserver>,
    ) -> Self {
        Self {
            attempt: Attempt::new(options.attempt),
            commands,
            status,
            observer,
            started_at: None,
        }
    }

    pub(crate) async fn run(
        mut self,
        loader: Arc<dyn QuestionSetLoader>,
        test_id: TestId,
        options: RuntimeOptions,
    ) {
        tracing::debug!(%test_id, loader = loader.name(), "loading test");
        let load = async move { loader.load(test_id).await };
        tokio::pin!(load);
        let mut loading = true;

        let period = options.tick_interval;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            let flow = tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        tracing::debug!(%test_id, "all handles dropped");
                        self.abandon()
                    }
                },

                loaded = &mut load, if loading => {
                    loading = false;
                    let flow = self.on_loaded(loaded.map_err(RuntimeError::from));
                    ticker.reset();
                    flow
                }

                _ = ticker.tick(), if self.attempt.is_active() => self.on_tick(),
            };

            if let Flow::Stop = flow {
                break;
            }
        }
        tracing::debug!(%test_id, phase = ?self.attempt.phase(), "attempt task ended");
    }

    fn on_loaded(
        &mut self,
        loaded: Result<(TestDefinition, Vec<Question>), RuntimeError>,
    ) -> Flow {
        let begun = loaded.and_then(|(test, questions)| {
            self.attempt
                .begin(test, questions)
                .map_err(RuntimeError::from)
        });

        match begun {
            Ok(phase) => {
                self.started_at = Some(Utc::now());
                if let Some(view) = self.attempt.view() {
                    self.observer.on_started(&view);
                }
                if phase == Phase::Submitted {
                    self.complete();
                } else {
                    self.publish();
                }
                Flow::Continue
            }
            Err(e) => {
                tracing::error!("attempt failed to start: {e}");
                self.observer.on_load_failed(&e);
                self.status.send_replace(AttemptStatus::Failed(e.to_string()));
                Flow::Stop
            }
        }
    }

    fn on_tick(&mut self) -> Flow {
        match self.attempt.tick() {
            Tick::Idle => {}
            Tick::Counted { remaining } => {
                self.observer.on_tick(remaining);
                self.publish();
            }
            Tick::Expired => {
                tracing::debug!("time expired");
                self.complete();
            }
        }
        Flow::Continue
    }

    fn handle(&mut self, command: Command) -> Flow {
        match command {
            Command::Answer {
                question,
                option,
                reply,
            } => {
                let result = match question {
                    Some(question) => self.attempt.answer(question, option),
                    None => self.attempt.answer_current(option),
                };
                let _ = reply.send(self.settle(result));
            }
            Command::Move { to, reply } => {
                let result = match to {
                    Move::Next => self.attempt.go_next(),
                    Move::Previous => self.attempt.go_previous(),
                    Move::To(index) => self.attempt.go_to(index),
                };
                let _ = reply.send(self.settle(result));
            }
            Command::Submit { reply } => {
                let result = self.attempt.submit();
                if let Ok(Submission::Submitted(_)) = &result {
                    self.complete();
                }
                let _ = reply.send(result);
            }
            Command::Abandon { reply } => {
                let flow = self.abandon();
                let _ = reply.send(());
                return flow;
            }
        }
        Flow::Continue
    }

    /// Publish the new view after a successful command.
    fn settle<T>(&mut self, result: Result<T, SessionError>) -> Result<T, SessionError> {
        match &result {
            Ok(_) => self.publish(),
            Err(e) if e.is_benign() => {
                tracing::warn!("command ignored: attempt already submitted");
            }
            Err(e) => tracing::debug!("command rejected: {e}"),
        }
        result
    }

    fn publish(&mut self) {
        if let Some(view) = self.attempt.view() {
            self.status.send_replace(AttemptStatus::InProgress(view));
        }
    }

    /// Emit the record of a freshly submitted attempt.
    fn complete(&mut self) {
        let completed_at = Utc::now();
        let started_at = self.started_at.unwrap_or(completed_at);
        let Some(record) =
            AttemptRecord::from_attempt(&self.attempt, Uuid::new_v4(), started_at, completed_at)
        else {
            return;
        };
        self.observer.on_submitted(&record);
        self.status.send_replace(AttemptStatus::Submitted(record));
    }

    fn abandon(&mut self) -> Flow {
        if self.attempt.phase() != Phase::Submitted {
            tracing::info!(phase = ?self.attempt.phase(), "attempt abandoned");
            self.status.send_replace(AttemptStatus::Abandoned);
        }
        Flow::Stop
    }
}
