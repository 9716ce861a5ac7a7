//! The `assessor validate` command.

use std::path::PathBuf;

use anyhow::Result;

use assessor_core::parser;

pub fn execute(tests_path: PathBuf) -> Result<()> {
    let files = if tests_path.is_dir() {
        parser::load_test_directory(&tests_path)?
    } else {
        vec![parser::parse_test_file(&tests_path)?]
    };

    let mut errors = 0;
    let mut notes = 0;

    for file in &files {
        println!(
            "Test {}: {} ({} questions)",
            file.test.id,
            file.test.title,
            file.questions.len()
        );

        for w in parser::validate_test_file(file) {
            let prefix = w
                .question_id
                .map(|id| format!("  [question {id}]"))
                .unwrap_or_else(|| "  ".to_string());
            let level = if w.fatal { "ERROR" } else { "WARNING" };
            println!("{prefix} {level}: {}", w.message);
            if w.fatal {
                errors += 1;
            } else {
                notes += 1;
            }
        }
    }

    if errors == 0 && notes == 0 {
        println!("All tests valid.");
    } else if notes > 0 {
        println!("\n{notes} warning(s) found.");
    }

    anyhow::ensure!(errors == 0, "{errors} error(s) found");
    Ok(())
}
