//! CLI entry point for the grade unblocker.
//!
//! Reads a saved grades page (or the bare `ENV` JSON it embeds), calculates
//! the hidden final grade and prints it with the per-group breakdown.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use grade_unblocker::grading::calculator::calculate;
use grade_unblocker::grading::types::{GradingOptions, NeverDropPolicy};
use grade_unblocker::output::{append_record, print_json, print_pretty, render_text};
use grade_unblocker::parser::{extract_env_json, parse_env};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "grade_unblocker")]
#[command(about = "Calculate a course grade the grades page keeps hidden", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the final grade from a saved grades page or ENV JSON file
    Grade {
        /// Path to the saved page or JSON file
        #[arg(value_name = "FILE")]
        source: String,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Optional: CSV file to append per-group results to
        #[arg(long)]
        csv: Option<String>,

        /// Count never-drop assignments toward group totals
        #[arg(long, default_value_t = false)]
        include_never_drop: bool,

        /// Calculate even when the page already shows the final grade
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
    /// Print the ENV JSON embedded in a saved grades page
    Extract {
        /// Path to the saved page
        #[arg(value_name = "FILE")]
        source: String,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/grade_unblocker.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("grade_unblocker.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Grade {
            source,
            json,
            csv,
            include_never_drop,
            force,
        } => {
            let options = GradingOptions {
                never_drop: if include_never_drop {
                    NeverDropPolicy::Include
                } else {
                    NeverDropPolicy::Exclude
                },
                force,
            };
            grade(&source, json, csv.as_deref(), &options)?;
        }
        Commands::Extract { source } => {
            let page = read_source(&source)?;
            let env_json = extract_env_json(&page)?;
            let value: serde_json::Value =
                serde_json::from_str(env_json).context("ENV is not valid JSON")?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

/// Calculates and prints the grade for one saved page.
#[tracing::instrument(skip(options), fields(source = %source))]
fn grade(source: &str, json: bool, csv: Option<&str>, options: &GradingOptions) -> Result<()> {
    let page = read_source(source)?;
    let env = parse_env(&page)?;

    let Some(report) = calculate(&env, options) else {
        return Ok(());
    };
    print_pretty(&report);

    if report.has_errors() {
        warn!("Some groups could not be scored and were left out of the total");
    }

    if json {
        print_json(&report)?;
    } else {
        print!("{}", render_text(&report));
    }

    if let Some(path) = csv {
        append_record(path, &report)?;
        info!(path, "Report appended to CSV");
    }

    Ok(())
}

fn read_source(source: &str) -> Result<String> {
    std::fs::read_to_string(source).with_context(|| format!("Failed to read {source}"))
}
