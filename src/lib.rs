//! statsd-mogrifier library
//!
//! This crate rewrites StatsD metric names using an ordered list of regex
//! rules. The first rule that matches renames the metric and derives tags
//! from its capture groups.

pub mod cli;
pub mod config;
pub mod error;
pub mod mogrifier;
pub mod report;
pub mod statsd;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Initialize the logging subsystem
///
/// Logs go to stderr so stdout stays free for mogrified lines.
///
/// # Arguments
/// * `level` - Default level when `RUST_LOG` is unset
/// * `format` - Text or JSON log lines
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: Level, format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
