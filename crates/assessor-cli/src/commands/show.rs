//! The `assessor show` command, and the summary shared with `take`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessor_core::report::{format_duration, option_label, AttemptRecord};
use assessor_core::session::SubmitTrigger;

pub fn execute(record_path: PathBuf, format: String) -> Result<()> {
    let record = AttemptRecord::load_json(&record_path)?;

    match format.as_str() {
        "text" => print_summary(&record),
        "markdown" => print!("{}", record.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&record)?),
        other => anyhow::bail!("unknown format: {other} (expected text, markdown or json)"),
    }
    Ok(())
}

/// Print the per-question table and the verdict.
pub fn print_summary(record: &AttemptRecord) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Your answer", "Correct", "Result"]);
    for (i, a) in record.answers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(a.question_id),
            Cell::new(option_label(a.selected)),
            Cell::new(option_label(a.correct)),
            Cell::new(if a.is_correct { "ok" } else { "wrong" }),
        ]);
    }

    println!("\n{}", record.test_title);
    println!("{table}");

    let ending = match record.trigger {
        SubmitTrigger::Manual => "submitted",
        SubmitTrigger::Expired => "time expired",
    };
    println!(
        "Answered {} of {}, {} correct. Time spent {} ({ending}).",
        record.answered_count(),
        record.result.total_questions,
        record.result.correct_count,
        format_duration(record.time_spent_secs),
    );
    println!(
        "Score: {}% (pass mark {}%) {}",
        record.result.score,
        record.result.passing_score,
        if record.result.passed { "PASSED" } else { "FAILED" }
    );
}
