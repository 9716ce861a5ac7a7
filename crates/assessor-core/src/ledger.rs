//! Answer ledger: which option the learner selected for each question.

use std::collections::HashMap;

use crate::error::SessionError;
use crate::model::{Question, QuestionId};

/// Mapping from question id to the selected option index.
///
/// The ledger knows the option count of every question in the attempt, so it
/// can reject selections for unknown questions and out-of-range options.
/// A question has no entry until it is answered.
#[derive(Debug, Clone, Default)]
pub struct AnswerLedger {
    option_counts: HashMap<QuestionId, usize>,
    selections: HashMap<QuestionId, usize>,
    frozen: bool,
}

impl AnswerLedger {
    /// An empty ledger accepting answers for `questions`.
    pub fn for_questions(questions: &[Question]) -> Self {
        Self {
            option_counts: questions.iter().map(|q| (q.id, q.options.len())).collect(),
            selections: HashMap::new(),
            frozen: false,
        }
    }

    /// Record a selection, replacing any earlier one for the same question.
    /// Returns the previous selection.
    pub fn record(
        &mut self,
        question: QuestionId,
        option: usize,
    ) -> Result<Option<usize>, SessionError> {
        if self.frozen {
            return Err(SessionError::SessionClosed);
        }
        let Some(&len) = self.option_counts.get(&question) else {
            return Err(SessionError::UnknownQuestion(question));
        };
        if option >= len {
            return Err(SessionError::OutOfRange { index: option, len });
        }
        Ok(self.selections.insert(question, option))
    }

    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.selections.contains_key(&question)
    }

    pub fn selection(&self, question: QuestionId) -> Option<usize> {
        self.selections.get(&question).copied()
    }

    /// Number of answered questions.
    pub fn answered_count(&self) -> usize {
        self.selections.len()
    }

    pub fn clear(&mut self) {
        self.selections.clear();
    }

    /// Reject every further `record`.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn questions() -> Vec<Question> {
        (1..=2)
            .map(|id| Question {
                id: QuestionId::new(id),
                prompt: format!("Q{id}"),
                options: vec![
                    AnswerOption::new("a", true),
                    AnswerOption::new("b", false),
                    AnswerOption::new("c", false),
                ],
                points: 1,
            })
            .collect()
    }

    #[test]
    fn overwrite_returns_previous() {
        let mut ledger = AnswerLedger::for_questions(&questions());
        let q1 = QuestionId::new(1);
        assert!(!ledger.is_answered(q1));
        assert_eq!(ledger.record(q1, 0).unwrap(), None);
        assert_eq!(ledger.record(q1, 2).unwrap(), Some(0));
        assert_eq!(ledger.selection(q1), Some(2));
        assert_eq!(ledger.answered_count(), 1);
    }

    #[test]
    fn rejects_unknown_question_and_bad_option() {
        let mut ledger = AnswerLedger::for_questions(&questions());
        assert_eq!(
            ledger.record(QuestionId::new(99), 0),
            Err(SessionError::UnknownQuestion(QuestionId::new(99)))
        );
        assert_eq!(
            ledger.record(QuestionId::new(2), 3),
            Err(SessionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(ledger.answered_count(), 0);
    }

    #[test]
    fn frozen_ledger_is_closed() {
        let mut ledger = AnswerLedger::for_questions(&questions());
        ledger.record(QuestionId::new(1), 1).unwrap();
        ledger.freeze();
        assert_eq!(
            ledger.record(QuestionId::new(1), 0),
            Err(SessionError::SessionClosed)
        );
        assert_eq!(ledger.selection(QuestionId::new(1)), Some(1));
    }
}
