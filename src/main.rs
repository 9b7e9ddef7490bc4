//! statsd-mogrifier - rewrite noisy StatsD metric names
//!
//! Reads DogStatsD lines from stdin and writes them to stdout with names
//! rewritten and tags added by the configured mogrifiers.

use std::io::{self, Write};

use anyhow::Result;
use clap::Parser;
use tracing::info;

use statsd_mogrifier::{
    cli::Cli,
    config::Config,
    report::{DryRunReport, ValidationReport},
    statsd,
};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    statsd_mogrifier::init_logging(cli.log_level.into(), cli.log_format)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_level = %cli.log_level,
        "Starting statsd-mogrifier"
    );

    // Load configuration: file first, then environment
    let mut config = Config::load_or_default(&cli.config)?;
    if !cli.mogrifiers.is_empty() {
        config = config.merge(Config::from_env(cli.mogrifiers.as_slice())?);
    }

    let set = config.mogrifier_set()?;

    let stdout = io::stdout();
    if cli.validate {
        let report = ValidationReport::new(&set);
        stdout.lock().write_all(report.render(cli.output_format)?.as_bytes())?;
        return Ok(());
    }

    if cli.dry_run {
        let report = DryRunReport::new(&set, cli.names.as_slice());
        stdout.lock().write_all(report.render(cli.output_format)?.as_bytes())?;
        return Ok(());
    }

    let stats = statsd::rewrite_stream(
        &set,
        io::stdin().lock(),
        io::BufWriter::new(stdout.lock()),
    )?;
    info!(
        lines = stats.lines,
        rewritten = stats.rewritten,
        passed_through = stats.passed_through,
        "Input exhausted"
    );

    Ok(())
}
