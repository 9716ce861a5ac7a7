//! The `assessor init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("assessor.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("tests")?;
    write_if_missing(Path::new("tests/example.toml"), EXAMPLE_TEST)?;

    println!("\nNext steps:");
    println!("  1. Run: assessor validate --tests tests/example.toml");
    println!("  2. Run: assessor take --test 1");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# assessor configuration

# What a missing or zero time limit means: "unlimited" or "immediate"
zero_time_limit = "unlimited"
tick_interval_ms = 1000
output_dir = "./assessor-results"

[source]
type = "files"
dir = "./tests"

# To load tests from the testing backend instead:
# [source]
# type = "http"
# base_url = "http://localhost:8000"
# api_token = "${ASSESSOR_API_TOKEN}"
"#;

const EXAMPLE_TEST: &str = r#"[test]
id = 1
title = "Workplace Safety Basics"
description = "A short example test to get started"
time_limit_minutes = 5
passing_score = 70

[[questions]]
id = 1
prompt = "What should you do first when you discover a fire?"
options = [
    { text = "Raise the alarm", correct = true },
    { text = "Finish your current task" },
    { text = "Open the windows" },
]

[[questions]]
id = 2
prompt = "Where should you go when the evacuation alarm sounds?"
options = [
    { text = "The nearest lift" },
    { text = "The designated assembly point", correct = true },
    { text = "Your car" },
]

[[questions]]
id = 3
prompt = "Who may remove a lockout tag from equipment?"
options = [
    { text = "Anyone who needs the equipment" },
    { text = "A supervisor on request" },
    { text = "The person who applied it", correct = true },
]
"#;
