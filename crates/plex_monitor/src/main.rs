mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use plex_monitor_core::{run_blocking, BatchSummary, RunOverrides};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Export Plex library metadata to CSV", long_about = None)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short = 'c', long = "config", default_value = "config.json")]
    config: PathBuf,

    /// Log file, appended to on every run
    #[arg(long = "log-file", default_value = "plex_monitor.log")]
    log_file: PathBuf,

    /// Export only this library (repeatable, replaces the configured list)
    #[arg(short = 'l', long = "library")]
    libraries: Vec<String>,

    /// Override the configured output directory
    #[arg(short = 'o', long = "output-dir")]
    output_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(&cli.log_file) {
        eprintln!("{} {err:#}", style("error:").red().bold());
        return ExitCode::FAILURE;
    }

    info!("{}", "=".repeat(60));
    info!("Plex Library Monitor - Starting");
    info!("{}", "=".repeat(60));

    match run(cli) {
        Ok(summary) => {
            info!("monitoring completed successfully");
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("monitoring failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<BatchSummary> {
    let overrides = RunOverrides {
        libraries: (!cli.libraries.is_empty()).then_some(cli.libraries),
        output_dir: cli.output_dir,
    };
    run_blocking(&cli.config, overrides)
        .with_context(|| format!("setup failed using {}", cli.config.display()))
}

fn print_summary(summary: &BatchSummary) {
    for outcome in &summary.outcomes {
        match &outcome.result {
            Ok(export) => match &export.csv_path {
                Some(path) => println!(
                    "{} {}: {} rows -> {}",
                    style("ok").green().bold(),
                    outcome.library,
                    export.record_count,
                    path.display()
                ),
                None => println!(
                    "{} {}: no items",
                    style("empty").yellow().bold(),
                    outcome.library
                ),
            },
            Err(err) => println!(
                "{} {}: {err}",
                style("failed").red().bold(),
                outcome.library
            ),
        }
    }
    println!(
        "{} {} libraries, {} failed, {} rows",
        style("done:").dim(),
        summary.processed(),
        summary.failed(),
        summary.total_records()
    );
}
