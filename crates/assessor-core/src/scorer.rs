//! Scoring of a finished attempt.
//!
//! Every question counts the same: a question is correct when the recorded
//! option is the option flagged correct, and unanswered questions are wrong.

use serde::{Deserialize, Serialize};

use crate::ledger::AnswerLedger;
use crate::model::{Question, QuestionId};

/// Outcome of a scored attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Questions answered correctly.
    pub correct_count: usize,
    /// Questions in the attempt.
    pub total_questions: usize,
    /// Rounded percentage of correct answers.
    pub score: u8,
    /// Pass mark the score was compared against.
    pub passing_score: u8,
    /// `score >= passing_score`.
    pub passed: bool,
}

/// How a single question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    /// Selected option index, `None` if unanswered.
    pub selected: Option<usize>,
    /// Index of the correct option.
    pub correct: Option<usize>,
    pub is_correct: bool,
}

/// Grade each question against the ledger, in question order.
pub fn grade(questions: &[Question], ledger: &AnswerLedger) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .map(|q| {
            let selected = ledger.selection(q.id);
            let correct = q.correct_index();
            QuestionOutcome {
                question_id: q.id,
                selected,
                correct,
                is_correct: selected.is_some() && selected == correct,
            }
        })
        .collect()
}

/// Score an attempt. Pure: identical inputs give identical results.
pub fn score(questions: &[Question], ledger: &AnswerLedger, passing_score: u8) -> AttemptResult {
    let correct_count = grade(questions, ledger)
        .iter()
        .filter(|o| o.is_correct)
        .count();
    let total_questions = questions.len();
    let score = percentage(correct_count, total_questions);

    AttemptResult {
        correct_count,
        total_questions,
        score,
        passing_score,
        passed: score >= passing_score,
    }
}

/// `round(correct / total * 100)` with halves rounded up, in integer math.
///
/// An empty test scores 0.
pub fn percentage(correct: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((200 * correct + total) / (2 * total)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerOption;

    fn make_questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|id| Question {
                id: QuestionId::new(id),
                prompt: format!("Question {id}"),
                options: vec![
                    AnswerOption::new("right", true),
                    AnswerOption::new("wrong", false),
                ],
                points: 1,
            })
            .collect()
    }

    #[test]
    fn four_of_five_passes_at_seventy() {
        let questions = make_questions(5);
        let mut ledger = AnswerLedger::for_questions(&questions);
        for id in 1..=4 {
            ledger.record(QuestionId::new(id), 0).unwrap();
        }
        ledger.record(QuestionId::new(5), 1).unwrap();

        let result = score(&questions, &ledger, 70);
        assert_eq!(result.correct_count, 4);
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.score, 80);
        assert!(result.passed);
    }

    #[test]
    fn empty_ledger_fails() {
        let questions = make_questions(3);
        let ledger = AnswerLedger::for_questions(&questions);
        let result = score(&questions, &ledger, 50);
        assert_eq!(result.correct_count, 0);
        assert_eq!(result.score, 0);
        assert!(!result.passed);
    }

    #[test]
    fn empty_question_list_scores_zero() {
        let ledger = AnswerLedger::default();
        let result = score(&[], &ledger, 1);
        assert_eq!(result.score, 0);
        assert_eq!(result.total_questions, 0);
        assert!(!result.passed);
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(5, 8), 63); // 62.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(0, 7), 0);
        assert_eq!(percentage(7, 7), 100);
    }

    #[test]
    fn score_matches_formula_for_every_subset_size() {
        for total in 1..=40u64 {
            let questions = make_questions(total);
            let mut ledger = AnswerLedger::for_questions(&questions);
            for answered in 1..=total {
                ledger.record(QuestionId::new(answered), 0).unwrap();
                let result = score(&questions, &ledger, 60);
                assert!(result.correct_count <= result.total_questions);
                // score - 0.5 <= 100c/t < score + 0.5
                let c = result.correct_count as u64 * 200;
                let t = result.total_questions as u64;
                let s = u64::from(result.score);
                assert!(c + t >= 2 * s * t, "{answered}/{total}");
                assert!(c + t < (2 * s + 2) * t, "{answered}/{total}");
            }
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let questions = make_questions(6);
        let mut ledger = AnswerLedger::for_questions(&questions);
        ledger.record(QuestionId::new(2), 0).unwrap();
        ledger.record(QuestionId::new(3), 1).unwrap();
        let first = score(&questions, &ledger, 30);
        let second = score(&questions, &ledger, 30);
        assert_eq!(first, second);
    }

    #[test]
    fn latest_selection_is_scored() {
        let questions = make_questions(1);
        let mut ledger = AnswerLedger::for_questions(&questions);
        ledger.record(QuestionId::new(1), 0).unwrap();
        ledger.record(QuestionId::new(1), 1).unwrap();
        assert_eq!(score(&questions, &ledger, 50).correct_count, 0);
    }

    #[test]
    fn grade_reports_unanswered() {
        let questions = make_questions(2);
        let mut ledger = AnswerLedger::for_questions(&questions);
        ledger.record(QuestionId::new(1), 0).unwrap();
        let outcomes = grade(&questions, &ledger);
        assert!(outcomes[0].is_correct);
        assert_eq!(outcomes[1].selected, None);
        assert_eq!(outcomes[1].correct, Some(0));
        assert!(!outcomes[1].is_correct);
    }
}
