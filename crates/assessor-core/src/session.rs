//! The attempt state machine.
//!
//! An [`Attempt`] moves through `Loading -> InProgress -> Submitted` and is the
//! only thing allowed to mutate its cursor, ledger and clock. It is purely
//! synchronous; the runtime crate owns one per task and feeds it commands and
//! ticks in order.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{SessionClock, Tick, ZeroLimitPolicy};
use crate::cursor::NavigationCursor;
use crate::error::{SessionError, ValidationError};
use crate::ledger::AnswerLedger;
use crate::model::{Question, QuestionId, TestDefinition, TestId};
use crate::scorer::{self, AttemptResult};

/// Lifecycle phase of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    InProgress,
    Submitted,
}

/// What caused the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTrigger {
    /// The learner submitted.
    Manual,
    /// The clock ran out.
    Expired,
}

/// Result of a `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// This call submitted the attempt.
    Submitted(AttemptResult),
    /// The attempt was already submitted; nothing changed.
    AlreadySubmitted,
}

/// Options applied when an attempt starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptOptions {
    /// Meaning of a zero or missing time limit.
    pub zero_time_limit: ZeroLimitPolicy,
}

/// What the presentation layer needs to render an in-progress attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub test_id: TestId,
    pub test_title: String,
    /// Zero-based cursor position.
    pub position: usize,
    pub total: usize,
    pub question: Question,
    /// Selected option for the current question.
    pub selected: Option<usize>,
    /// Answered flag per question, in question order.
    pub answered: Vec<bool>,
    /// Seconds left, `None` when unlimited.
    pub remaining_secs: Option<u64>,
    pub elapsed_secs: u64,
}

impl SessionView {
    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }
}

#[derive(Debug, Clone)]
struct ActiveSession {
    test: Arc<TestDefinition>,
    questions: Arc<[Question]>,
    cursor: NavigationCursor,
    ledger: AnswerLedger,
    clock: SessionClock,
}

#[derive(Debug, Clone)]
enum State {
    Loading,
    InProgress(ActiveSession),
    Submitted {
        session: ActiveSession,
        result: AttemptResult,
        trigger: SubmitTrigger,
    },
}

/// One learner's run through a test.
#[derive(Debug, Clone)]
pub struct Attempt {
    state: State,
    options: AttemptOptions,
}

impl Default for Attempt {
    fn default() -> Self {
        Self::new(AttemptOptions::default())
    }
}

impl Attempt {
    /// A new attempt waiting for its test to load.
    pub fn new(options: AttemptOptions) -> Self {
        Self {
            state: State::Loading,
            options,
        }
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::Loading => Phase::Loading,
            State::InProgress(_) => Phase::InProgress,
            State::Submitted { .. } => Phase::Submitted,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::InProgress(_))
    }

    /// `Loading -> InProgress`: snapshot the questions, start the clock, put
    /// the cursor on the first question.
    ///
    /// The input is validated first; on error the attempt stays in `Loading`.
    /// With `ZeroLimitPolicy::Immediate` and no time limit the attempt is
    /// submitted as expired before this returns.
    pub fn begin(
        &mut self,
        test: impl Into<Arc<TestDefinition>>,
        questions: Vec<Question>,
    ) -> Result<Phase, SessionError> {
        if !matches!(self.state, State::Loading) {
            return Err(SessionError::AlreadyStarted);
        }
        let test = test.into();
        validate(&test, &questions)?;

        let cursor =
            NavigationCursor::new(questions.len()).ok_or(ValidationError::EmptyQuestionSet)?;
        let mut ledger = AnswerLedger::for_questions(&questions);
        ledger.clear();
        let mut clock = SessionClock::new();
        clock.start(test.time_limit_secs(), self.options.zero_time_limit);

        tracing::info!(
            test_id = %test.id,
            questions = questions.len(),
            time_limit_secs = test.time_limit_secs(),
            "attempt started"
        );

        let expired = clock.is_expired();
        self.state = State::InProgress(ActiveSession {
            test,
            questions: questions.into(),
            cursor,
            ledger,
            clock,
        });

        if expired {
            self.finish(SubmitTrigger::Expired);
        }
        Ok(self.phase())
    }

    /// Record the learner's selection for `question`, replacing an earlier one.
    pub fn answer(
        &mut self,
        question: QuestionId,
        option: usize,
    ) -> Result<Option<usize>, SessionError> {
        let session = self.active_mut()?;
        let previous = session.ledger.record(question, option)?;
        tracing::debug!(%question, option, ?previous, "answer recorded");
        Ok(previous)
    }

    /// Answer the question under the cursor.
    pub fn answer_current(&mut self, option: usize) -> Result<Option<usize>, SessionError> {
        let session = self.active_mut()?;
        let question = session.questions[session.cursor.index()].id;
        self.answer(question, option)
    }

    pub fn go_next(&mut self) -> Result<usize, SessionError> {
        let index = self.active_mut()?.cursor.next();
        tracing::debug!(index, "cursor moved");
        Ok(index)
    }

    pub fn go_previous(&mut self) -> Result<usize, SessionError> {
        let index = self.active_mut()?.cursor.previous();
        tracing::debug!(index, "cursor moved");
        Ok(index)
    }

    /// Jump to `index`. On error the cursor does not move.
    pub fn go_to(&mut self, index: usize) -> Result<usize, SessionError> {
        let index = self.active_mut()?.cursor.jump_to(index)?;
        tracing::debug!(index, "cursor moved");
        Ok(index)
    }

    /// Advance the clock by one second. On the expiry edge the attempt is
    /// submitted before this returns. Outside `InProgress` this is a no-op.
    pub fn tick(&mut self) -> Tick {
        let State::InProgress(session) = &mut self.state else {
            return Tick::Idle;
        };
        let tick = session.clock.tick();
        if tick == Tick::Expired {
            self.finish(SubmitTrigger::Expired);
        }
        tick
    }

    /// Submit the attempt. A second call is a no-op.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        match self.phase() {
            Phase::Loading => Err(SessionError::NotStarted),
            Phase::Submitted => Ok(Submission::AlreadySubmitted),
            Phase::InProgress => Ok(self
                .finish(SubmitTrigger::Manual)
                .map(Submission::Submitted)
                .unwrap_or(Submission::AlreadySubmitted)),
        }
    }

    /// `InProgress -> Submitted`, shared by manual submission and expiry.
    fn finish(&mut self, trigger: SubmitTrigger) -> Option<AttemptResult> {
        let mut session = match std::mem::replace(&mut self.state, State::Loading) {
            State::InProgress(session) => session,
            other => {
                self.state = other;
                return None;
            }
        };

        session.clock.stop();
        session.ledger.freeze();
        let result =
            scorer::score(&session.questions, &session.ledger, session.test.passing_score);

        tracing::info!(
            test_id = %session.test.id,
            ?trigger,
            correct = result.correct_count,
            total = result.total_questions,
            score = result.score,
            passed = result.passed,
            "attempt submitted"
        );

        self.state = State::Submitted {
            session,
            result: result.clone(),
            trigger,
        };
        Some(result)
    }

    fn active_mut(&mut self) -> Result<&mut ActiveSession, SessionError> {
        match &mut self.state {
            State::Loading => Err(SessionError::NotStarted),
            State::InProgress(session) => Ok(session),
            State::Submitted { .. } => Err(SessionError::SessionClosed),
        }
    }

    fn session(&self) -> Option<&ActiveSession> {
        match &self.state {
            State::Loading => None,
            State::InProgress(session) | State::Submitted { session, .. } => Some(session),
        }
    }

    pub fn test(&self) -> Option<&TestDefinition> {
        self.session().map(|s| s.test.as_ref())
    }

    pub fn questions(&self) -> &[Question] {
        self.session().map(|s| &s.questions[..]).unwrap_or(&[])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.session().map(|s| s.cursor.index())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session().map(|s| &s.questions[s.cursor.index()])
    }

    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.session().is_some_and(|s| s.ledger.is_answered(question))
    }

    pub fn ledger(&self) -> Option<&AnswerLedger> {
        self.session().map(|s| &s.ledger)
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.session().and_then(|s| s.clock.remaining_secs())
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.session().map(|s| s.clock.elapsed_secs()).unwrap_or(0)
    }

    pub fn result(&self) -> Option<&AttemptResult> {
        match &self.state {
            State::Submitted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn trigger(&self) -> Option<SubmitTrigger> {
        match &self.state {
            State::Submitted { trigger, .. } => Some(*trigger),
            _ => None,
        }
    }

    /// Display state while `InProgress`.
    pub fn view(&self) -> Option<SessionView> {
        let State::InProgress(session) = &self.state else {
            return None;
        };
        let question = &session.questions[session.cursor.index()];
        Some(SessionView {
            test_id: session.test.id,
            test_title: session.test.title.clone(),
            position: session.cursor.index(),
            total: session.cursor.len(),
            question: question.clone(),
            selected: session.ledger.selection(question.id),
            answered: session
                .questions
                .iter()
                .map(|q| session.ledger.is_answered(q.id))
                .collect(),
            remaining_secs: session.clock.remaining_secs(),
            elapsed_secs: session.clock.elapsed_secs(),
        })
    }
}

/// Check a loaded test before an attempt may start.
pub fn validate(test: &TestDefinition, questions: &[Question]) -> Result<(), ValidationError> {
    if questions.is_empty() {
        return Err(ValidationError::EmptyQuestionSet);
    }
    if test.passing_score == 0 || test.passing_score > 100 {
        return Err(ValidationError::PassingScoreOutOfRange(test.passing_score));
    }

    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id) {
            return Err(ValidationError::DuplicateQuestion(q.id));
        }
        if q.options.is_empty() {
            return Err(ValidationError::NoOptions(q.id));
        }
        let count = q.correct_count();
        if count != 1 {
            return Err(ValidationError::CorrectOptionCount {
                question: q.id,
                count,
            });
        }
    }
    Ok(())
}
