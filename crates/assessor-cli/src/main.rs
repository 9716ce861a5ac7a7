//! assessor CLI — take and manage timed multiple-choice tests.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "assessor", version, about = "Timed multiple-choice assessments")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a test interactively
    Take {
        /// Test id
        #[arg(long)]
        test: u64,

        /// Test file or directory (overrides the configured source)
        #[arg(long)]
        tests: Option<PathBuf>,

        /// Testing backend base URL (overrides the configured source)
        #[arg(long, conflicts_with = "tests")]
        api_url: Option<String>,

        /// Output directory for the attempt record
        #[arg(long)]
        output: Option<PathBuf>,

        /// Record format: json, markdown, none (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate test TOML files
    Validate {
        /// Path to a test file or directory
        #[arg(long)]
        tests: PathBuf,
    },

    /// List the tests in a directory or on the backend
    List {
        /// Test file or directory (defaults to the configured source)
        #[arg(long)]
        tests: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a saved attempt record
    Show {
        /// Attempt record JSON
        #[arg(long)]
        record: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example test
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "assessor=info".parse::<tracing_subscriber::filter::Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            test,
            tests,
            api_url,
            output,
            format,
            config,
        } => commands::take::execute(test, tests, api_url, output, format, config).await,
        Commands::Validate { tests } => commands::validate::execute(tests),
        Commands::List { tests, config } => commands::list::execute(tests, config).await,
        Commands::Show { record, format } => commands::show::execute(record, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
