//! Completed attempt records with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::TestId;
use crate::scorer::{self, AttemptResult, QuestionOutcome};
use crate::session::{Attempt, SubmitTrigger};

/// The record emitted once an attempt is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Unique attempt identifier.
    pub id: Uuid,
    pub test_id: TestId,
    pub test_title: String,
    /// Whether the learner submitted or the clock ran out.
    pub trigger: SubmitTrigger,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Clock seconds counted while the attempt was in progress.
    pub time_spent_secs: u64,
    pub result: AttemptResult,
    /// Per-question outcomes in question order.
    pub answers: Vec<QuestionOutcome>,
}

impl AttemptRecord {
    /// Build the record of a submitted attempt. `None` until submission.
    pub fn from_attempt(
        attempt: &Attempt,
        id: Uuid,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Option<Self> {
        let result = attempt.result()?.clone();
        let trigger = attempt.trigger()?;
        let test = attempt.test()?;
        let ledger = attempt.ledger()?;

        Some(Self {
            id,
            test_id: test.id,
            test_title: test.title.clone(),
            trigger,
            started_at,
            completed_at,
            time_spent_secs: attempt.elapsed_secs(),
            result,
            answers: scorer::grade(attempt.questions(), ledger),
        })
    }

    /// Number of questions with a recorded answer.
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.selected.is_some()).count()
    }

    /// Save the record as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize record")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write record to {}", path.display()))?;
        Ok(())
    }

    /// Load a record from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read record from {}", path.display()))?;
        let record: AttemptRecord =
            serde_json::from_str(&content).context("failed to parse record JSON")?;
        Ok(record)
    }

    /// Format the record as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let verdict = if self.result.passed { "PASSED" } else { "FAILED" };

        md.push_str(&format!("## {}: {}\n\n", self.test_title, verdict));
        md.push_str(&format!(
            "**Score:** {}% (pass mark {}%)  \n",
            self.result.score, self.result.passing_score
        ));
        md.push_str(&format!(
            "**Correct:** {} of {}  \n",
            self.result.correct_count, self.result.total_questions
        ));
        md.push_str(&format!(
            "**Submitted:** {} ({})  \n",
            self.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            match self.trigger {
                SubmitTrigger::Manual => "by learner",
                SubmitTrigger::Expired => "time expired",
            }
        ));
        md.push_str(&format!(
            "**Time spent:** {}\n\n",
            format_duration(self.time_spent_secs)
        ));

        md.push_str("| # | Question | Selected | Correct | Result |\n");
        md.push_str("|---|----------|----------|---------|--------|\n");
        for (i, a) in self.answers.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                a.question_id,
                option_label(a.selected),
                option_label(a.correct),
                if a.is_correct { "ok" } else { "wrong" }
            ));
        }

        md
    }
}

/// One-based option label, `-` for none.
pub fn option_label(index: Option<usize>) -> String {
    index
        .map(|i| (i + 1).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `m:ss` formatting used for remaining and elapsed time.
pub fn format_duration(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
