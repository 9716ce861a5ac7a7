//! TOML test-file parser.
//!
//! Loads tests from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{AnswerOption, Question, QuestionId, TestDefinition, TestId};

/// Intermediate TOML structure for parsing test files.
#[derive(Debug, Deserialize)]
struct TomlTestFile {
    test: TomlTestHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlTestHeader {
    id: u64,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
    #[serde(default = "default_passing_score")]
    passing_score: u8,
}

fn default_passing_score() -> u8 {
    70
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: u64,
    prompt: String,
    #[serde(default = "default_points")]
    points: u32,
    #[serde(default)]
    options: Vec<TomlOption>,
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    text: String,
    #[serde(default)]
    correct: bool,
}

/// A test definition together with its ordered questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFile {
    pub test: TestDefinition,
    pub questions: Vec<Question>,
}

/// Parse a single TOML file into a `TestFile`.
pub fn parse_test_file(path: &Path) -> Result<TestFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read test file: {}", path.display()))?;

    parse_test_file_str(&content, path)
}

/// Parse a TOML string into a `TestFile` (useful for testing).
pub fn parse_test_file_str(content: &str, source_path: &Path) -> Result<TestFile> {
    let parsed: TomlTestFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: QuestionId::new(q.id),
            prompt: q.prompt,
            options: q
                .options
                .into_iter()
                .map(|o| AnswerOption::new(o.text, o.correct))
                .collect(),
            points: q.points,
        })
        .collect();

    Ok(TestFile {
        test: TestDefinition {
            id: TestId::new(parsed.test.id),
            title: parsed.test.title,
            description: parsed.test.description,
            time_limit_minutes: parsed.test.time_limit_minutes,
            passing_score: parsed.test.passing_score,
        },
        questions,
    })
}

/// Recursively load all `.toml` test files from a directory.
pub fn load_test_directory(dir: &Path) -> Result<Vec<TestFile>> {
    let mut tests = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            tests.extend(load_test_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_test_file(&path) {
                Ok(file) => tests.push(file),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(tests)
}

/// A warning from test-file validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
    /// Whether an attempt on this test would be refused at start.
    pub fatal: bool,
}

impl ValidationWarning {
    fn fatal(question_id: Option<QuestionId>, message: impl Into<String>) -> Self {
        Self {
            question_id,
            message: message.into(),
            fatal: true,
        }
    }

    fn note(question_id: Option<QuestionId>, message: impl Into<String>) -> Self {
        Self {
            question_id,
            message: message.into(),
            fatal: false,
        }
    }
}

/// Validate a test file for common issues.
///
/// Unlike [`crate::session::validate`], which stops at the first problem,
/// this collects every issue, including ones that do not block an attempt.
pub fn validate_test_file(file: &TestFile) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let test = &file.test;

    if file.questions.is_empty() {
        warnings.push(ValidationWarning::fatal(None, "test has no questions"));
    }

    if test.passing_score == 0 || test.passing_score > 100 {
        warnings.push(ValidationWarning::fatal(
            None,
            format!(
                "passing_score must be between 1 and 100, got {}",
                test.passing_score
            ),
        ));
    }

    if test.time_limit_minutes.unwrap_or(0) == 0 {
        warnings.push(ValidationWarning::note(
            None,
            "no time limit; handled by the zero_time_limit policy",
        ));
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for q in &file.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(ValidationWarning::fatal(
                Some(q.id),
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in &file.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::note(Some(q.id), "prompt is empty"));
        }

        if q.options.is_empty() {
            warnings.push(ValidationWarning::fatal(Some(q.id), "no answer options"));
            continue;
        }

        let correct = q.correct_count();
        if correct != 1 {
            warnings.push(ValidationWarning::fatal(
                Some(q.id),
                format!("expected exactly one correct option, found {correct}"),
            ));
        }

        if q.options.iter().any(|o| o.text.trim().is_empty()) {
            warnings.push(ValidationWarning::note(Some(q.id), "an option has empty text"));
        }
    }

    warnings
}
