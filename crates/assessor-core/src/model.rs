//! Core data model types for assessor.
//!
//! These are the read-only inputs of an attempt: the test definition and its
//! ordered questions, as supplied by a loader.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(u64);

impl TestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Identifier of a question, unique within a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(u64);

impl QuestionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TestId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(TestId)
            .map_err(|_| format!("invalid test id: {s}"))
    }
}

/// Test metadata: title, time limit and pass mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Unique identifier for this test.
    pub id: TestId,
    /// Human-readable title.
    pub title: String,
    /// Description shown before the test starts.
    #[serde(default)]
    pub description: String,
    /// Time limit in minutes. `None` and `Some(0)` both go through the
    /// zero-limit policy.
    #[serde(default)]
    pub time_limit_minutes: Option<u32>,
    /// Minimum score percentage (1-100) needed to pass.
    pub passing_score: u8,
}

impl TestDefinition {
    /// Total time allowed in seconds, `0` when there is no limit.
    pub fn time_limit_secs(&self) -> u64 {
        u64::from(self.time_limit_minutes.unwrap_or(0)) * 60
    }
}

/// A catalogue entry: a test and how many questions it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub test: TestDefinition,
    pub question_count: usize,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within the test.
    pub id: QuestionId,
    /// The question text.
    pub prompt: String,
    /// Answer options in display order.
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Points for a correct answer. Informational; scoring is unweighted.
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    1
}

impl Question {
    /// Index of the first option flagged correct.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }

    /// Number of options flagged correct.
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }
}

/// One answer option of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option text.
    pub text: String,
    /// Whether this option is the correct answer.
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_limit_conversion() {
        let mut test = TestDefinition {
            id: TestId::new(1),
            title: "Basics".into(),
            description: String::new(),
            time_limit_minutes: Some(2),
            passing_score: 70,
        };
        assert_eq!(test.time_limit_secs(), 120);
        test.time_limit_minutes = None;
        assert_eq!(test.time_limit_secs(), 0);
    }

    #[test]
    fn correct_index_finds_first_flag() {
        let q = Question {
            id: QuestionId::new(7),
            prompt: "Pick".into(),
            options: vec![
                AnswerOption::new("a", false),
                AnswerOption::new("b", true),
                AnswerOption::new("c", true),
            ],
            points: 1,
        };
        assert_eq!(q.correct_index(), Some(1));
        assert_eq!(q.correct_count(), 2);
    }

    #[test]
    fn test_id_parse() {
        assert_eq!("42".parse::<TestId>().unwrap(), TestId::new(42));
        assert!("abc".parse::<TestId>().is_err());
    }

    #[test]
    fn question_serde_defaults() {
        let json = r#"{"id": 3, "prompt": "Q", "options": [{"text": "x"}]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, QuestionId::new(3));
        assert_eq!(q.points, 1);
        assert!(!q.options[0].is_correct);
    }
}
