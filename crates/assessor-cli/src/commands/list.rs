//! The `assessor list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessor_core::model::TestSummary;
use assessor_core::report::format_duration;
use assessor_loader::config::load_config_from;
use assessor_loader::{FileLoader, HttpLoader, SourceConfig};

pub async fn execute(tests: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let source = match tests {
        Some(dir) => SourceConfig::Files { dir },
        None => load_config_from(config_path.as_deref())?.source,
    };

    let (summaries, origin) = match &source {
        SourceConfig::Files { dir } => (
            FileLoader::open(dir)?.summaries(),
            dir.display().to_string(),
        ),
        SourceConfig::Http {
            base_url,
            api_token,
        } => {
            let loader = HttpLoader::new(base_url, api_token.clone())?;
            (loader.list_tests().await?, base_url.clone())
        }
    };

    if summaries.is_empty() {
        println!("No tests found in {origin}");
        return Ok(());
    }
    println!("{}", summary_table(&summaries));
    Ok(())
}

fn summary_table(summaries: &[TestSummary]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions", "Time limit", "Pass mark"]);
    for summary in summaries {
        let test = &summary.test;
        let limit = match test.time_limit_secs() {
            0 => "none".to_string(),
            secs => format_duration(secs),
        };
        table.add_row(vec![
            Cell::new(test.id),
            Cell::new(&test.title),
            Cell::new(summary.question_count),
            Cell::new(limit),
            Cell::new(format!("{}%", test.passing_score)),
        ]);
    }
    table
}
