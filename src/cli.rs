//! CLI argument parsing for statsd-mogrifier
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: mogrifiers.yaml, env: MOGRIFIER_CONFIG)
//! - `--mogrifiers`: Comma-separated mogrifier keys to load from the environment (env: DOG_STATSD_MOGRIFIERS)
//! - `--validate`: Validate configuration and exit
//! - `--dry-run`: Show configured mogrifiers and mogrify the given NAMEs
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: MOGRIFIER_LOG_LEVEL)
//! - `--log-format`: Log output format (text/json, env: MOGRIFIER_LOG_FORMAT)
//! - `--output-format`: Output format for validate/dry-run (text/json/yaml)
//!
//! Without `--validate` or `--dry-run`, DogStatsD lines are read from stdin
//! and the mogrified lines are written to stdout.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// statsd-mogrifier - rewrite noisy StatsD metric names
///
/// Matches metric names against an ordered list of regex rules and
/// rewrites the first match into a normalized name plus tags.
#[derive(Parser, Debug)]
#[command(name = "statsd-mogrifier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "mogrifiers.yaml",
        env = "MOGRIFIER_CONFIG"
    )]
    pub config: PathBuf,

    /// Mogrifier keys to load from DOG_STATSD_MOGRIFIER_<KEY>_* variables
    #[arg(
        long,
        value_name = "KEYS",
        value_delimiter = ',',
        env = "DOG_STATSD_MOGRIFIERS"
    )]
    pub mogrifiers: Vec<String>,

    /// Validate configuration and exit
    #[arg(long)]
    pub validate: bool,

    /// Show configured mogrifiers and mogrify the given names
    #[arg(long)]
    pub dry_run: bool,

    /// Metric names to mogrify in --dry-run mode
    #[arg(value_name = "NAME", requires = "dry_run")]
    pub names: Vec<String>,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "MOGRIFIER_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "text",
        env = "MOGRIFIER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Output format for --validate and --dry-run
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

/// Output format options for validate and dry-run modes
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
