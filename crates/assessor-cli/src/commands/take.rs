//! The `assessor take` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use assessor_core::model::TestId;
use assessor_core::report::{format_duration, AttemptRecord};
use assessor_core::session::{AttemptOptions, SessionView, SubmitTrigger};
use assessor_core::traits::QuestionSetLoader;
use assessor_loader::config::{create_loader, load_config_from};
use assessor_loader::SourceConfig;
use assessor_runtime::{
    spawn_attempt, AttemptHandle, AttemptObserver, AttemptStatus, RuntimeError, RuntimeOptions,
};

use super::show::print_summary;

/// Remaining-time marks that get a console warning.
const WARN_AT_SECS: [u64; 2] = [60, 10];

/// Console observer for clock events.
struct ConsoleObserver;

impl AttemptObserver for ConsoleObserver {
    fn on_started(&self, view: &SessionView) {
        let limit = view
            .remaining_secs
            .map(format_duration)
            .unwrap_or_else(|| "none".to_string());
        println!(
            "Starting \"{}\": {} questions, time limit {limit}",
            view.test_title, view.total
        );
        println!("Commands: <n> answer, n next, p previous, g <n> go to, s submit, q quit");
    }

    fn on_tick(&self, remaining_secs: Option<u64>) {
        if let Some(secs) = remaining_secs.filter(|s| WARN_AT_SECS.contains(s)) {
            println!("-- {} remaining --", format_duration(secs));
        }
    }

    fn on_submitted(&self, record: &AttemptRecord) {
        if record.trigger == SubmitTrigger::Expired {
            println!("\nTime is up! Your answers were submitted automatically.");
        }
    }

    fn on_load_failed(&self, error: &RuntimeError) {
        tracing::debug!("load failed: {error}");
    }
}

/// One line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// Zero-based option index.
    Answer(usize),
    Next,
    Previous,
    /// Zero-based question index.
    GoTo(usize),
    Submit,
    Quit,
    Help,
}

/// Parse a line of input. Numbers are one-based on the console.
fn parse_input(line: &str) -> Option<Input> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let arg = parts.next();
    if parts.next().is_some() {
        return None;
    }
    let one_based = |s: &str| s.parse::<usize>().ok().and_then(|n| n.checked_sub(1));

    match (head, arg) {
        ("a", Some(n)) => one_based(n).map(Input::Answer),
        ("g", Some(n)) => one_based(n).map(Input::GoTo),
        ("n", None) => Some(Input::Next),
        ("p", None) => Some(Input::Previous),
        ("s", None) => Some(Input::Submit),
        ("q", None) => Some(Input::Quit),
        ("h" | "?", None) => Some(Input::Help),
        (n, None) => one_based(n).map(Input::Answer),
        _ => None,
    }
}

fn render(view: &SessionView) {
    let time = view
        .remaining_secs
        .map(|secs| format!("  time left {}", format_duration(secs)))
        .unwrap_or_default();
    println!(
        "\nQuestion {} of {}  [answered {}/{}]{time}",
        view.position + 1,
        view.total,
        view.answered_count(),
        view.total
    );
    println!("{}", view.question.prompt);
    for (i, option) in view.question.options.iter().enumerate() {
        let mark = if view.selected == Some(i) { "x" } else { " " };
        println!("  [{mark}] {}. {}", i + 1, option.text);
    }
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn execute(
    test: u64,
    tests: Option<PathBuf>,
    api_url: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats: Vec<&str> = format.split(',').map(str::trim).collect();
    if let Some(bad) = formats
        .iter()
        .find(|f| !matches!(**f, "json" | "markdown" | "none"))
    {
        anyhow::bail!("unknown format: {bad} (expected json, markdown or none)");
    }

    let config = load_config_from(config_path.as_deref())?;
    let source = match (tests, api_url) {
        (Some(dir), _) => SourceConfig::Files { dir },
        (None, Some(base_url)) => {
            let api_token = match &config.source {
                SourceConfig::Http { api_token, .. } => api_token.clone(),
                SourceConfig::Files { .. } => None,
            };
            SourceConfig::Http {
                base_url,
                api_token,
            }
        }
        (None, None) => config.source.clone(),
    };
    tracing::debug!(?source, "resolved test source");

    let loader: Arc<dyn QuestionSetLoader> = Arc::from(create_loader(&source)?);
    let options = RuntimeOptions {
        attempt: AttemptOptions {
            zero_time_limit: config.zero_time_limit,
        },
        tick_interval: Duration::from_millis(config.tick_interval_ms),
    };
    let handle = spawn_attempt(loader, TestId::new(test), options, Arc::new(ConsoleObserver));

    let mut updates = handle.subscribe();
    let status = updates
        .wait_for(|s| !matches!(s, AttemptStatus::Loading))
        .await
        .map(|s| s.clone())
        .context("attempt task stopped while loading")?;

    if let AttemptStatus::InProgress(view) = &status {
        render(view);
        let stdin = BufReader::new(tokio::io::stdin());
        interact(&handle, updates, stdin).await?;
    }

    match handle.wait_for_completion().await {
        AttemptStatus::Submitted(record) => {
            print_summary(&record);
            let output = output.unwrap_or(config.output_dir);
            save_record(&record, &output, &formats)?;
            Ok(())
        }
        AttemptStatus::Abandoned => {
            println!("\nAttempt abandoned; nothing recorded.");
            Ok(())
        }
        AttemptStatus::Failed(message) => anyhow::bail!(message),
        other => anyhow::bail!("attempt ended unexpectedly: {other:?}"),
    }
}

/// Feed input lines to the attempt until it is submitted or abandoned.
///
/// `status` must be the receiver that observed the attempt start, so a
/// submission that lands before the first line is still seen.
async fn interact<R>(
    handle: &AttemptHandle,
    mut status: watch::Receiver<AttemptStatus>,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    return on_end_of_input(handle).await;
                };
                if !apply(handle, &line).await? {
                    return Ok(());
                }
            }
            changed = status.changed() => {
                if changed.is_err() || status.borrow().is_terminal() {
                    return Ok(());
                }
            }
        }
    }
}

/// Apply one input line. Returns `false` once the attempt is over.
async fn apply(handle: &AttemptHandle, line: &str) -> Result<bool> {
    if line.trim().is_empty() {
        return Ok(true);
    }
    let Some(input) = parse_input(line) else {
        println!("Unrecognized input: {}. Type h for help.", line.trim());
        return Ok(true);
    };

    let result = match input {
        Input::Answer(option) => handle.answer_current(option).await.map(|_| ()),
        Input::Next => handle.go_next().await.map(|_| ()),
        Input::Previous => handle.go_previous().await.map(|_| ()),
        Input::GoTo(index) => handle.go_to(index).await.map(|_| ()),
        Input::Submit => {
            handle.submit().await?;
            return Ok(false);
        }
        Input::Quit => {
            handle.abandon().await?;
            return Ok(false);
        }
        Input::Help => {
            println!("<n> or a <n>: answer option n; n: next; p: previous; g <n>: go to question n; s: submit; q: quit");
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_benign() => return Ok(false),
        Err(RuntimeError::Session(e)) => println!("{e}"),
        Err(e) => return Err(e.into()),
    }

    if let Some(view) = handle.status().view() {
        render(view);
    }
    Ok(true)
}

/// With a running clock, closed input waits for expiry; otherwise the
/// attempt can never finish and is abandoned.
async fn on_end_of_input(handle: &AttemptHandle) -> Result<()> {
    let timed = handle
        .status()
        .view()
        .is_some_and(|v| v.remaining_secs.is_some());
    if timed {
        println!("\nInput closed; waiting for the time limit.");
    } else {
        handle.abandon().await?;
    }
    Ok(())
}

fn save_record(record: &AttemptRecord, output: &std::path::Path, formats: &[&str]) -> Result<()> {
    let timestamp = record.completed_at.format("%Y-%m-%dT%H%M%S");
    let stem = format!("attempt-{}-{timestamp}", record.test_id);

    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                record.save_json(&path)?;
                println!("Record saved to: {}", path.display());
            }
            "markdown" => {
                std::fs::create_dir_all(output)?;
                let path = output.join(format!("{stem}.md"));
                std::fs::write(&path, record.to_markdown())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Markdown saved to: {}", path.display());
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessor_core::model::{AnswerOption, Question, QuestionId, TestDefinition};
    use assessor_loader::MockLoader;
    use assessor_runtime::NoopObserver;

    #[test]
    fn parses_console_input() {
        assert_eq!(parse_input("2"), Some(Input::Answer(1)));
        assert_eq!(parse_input("a 1"), Some(Input::Answer(0)));
        assert_eq!(parse_input(" n "), Some(Input::Next));
        assert_eq!(parse_input("p"), Some(Input::Previous));
        assert_eq!(parse_input("g 5"), Some(Input::GoTo(4)));
        assert_eq!(parse_input("s"), Some(Input::Submit));
        assert_eq!(parse_input("q"), Some(Input::Quit));
    }

    #[tokio::test(start_paused = true)]
    async fn interact_sees_expiry_before_first_line() {
        let test = TestDefinition {
            id: TestId::new(1),
            title: "Safety".into(),
            description: String::new(),
            time_limit_minutes: Some(1),
            passing_score: 50,
        };
        let questions = vec![Question {
            id: QuestionId::new(1),
            prompt: "Exit?".into(),
            options: vec![AnswerOption::new("Door", true), AnswerOption::new("Window", false)],
            points: 1,
        }];
        let handle = spawn_attempt(
            Arc::new(MockLoader::with_test(test, questions)),
            TestId::new(1),
            RuntimeOptions::default(),
            Arc::new(NoopObserver),
        );

        let mut updates = handle.subscribe();
        updates
            .wait_for(|s| matches!(s, AttemptStatus::InProgress(_)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(61)).await;

        // Input that never produces a line.
        let (_writer, reader) = tokio::io::duplex(64);
        tokio::time::timeout(
            Duration::from_secs(5),
            interact(&handle, updates, BufReader::new(reader)),
        )
        .await
        .expect("interact returns once the attempt is submitted")
        .unwrap();
        assert!(handle.status().record().is_some());
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(parse_input("0"), None);
        assert_eq!(parse_input("g"), None);
        assert_eq!(parse_input("a x"), None);
        assert_eq!(parse_input("n 2"), None);
        assert_eq!(parse_input("hello"), None);
    }
}
