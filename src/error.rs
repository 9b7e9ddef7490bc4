//! Error types for statsd-mogrifier
//!
//! This module defines the error types used throughout the crate.

use thiserror::Error;

/// Template expansion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// 존재하지 않는 캡처 그룹 참조
    #[error("Capture group ${index} is out of range ({available} groups available)")]
    IndexOutOfRange { index: usize, available: usize },
}

/// Mogrifier set construction errors
///
/// Both variants identify the offending entry by its configuration
/// position and, when configured, its key.
#[derive(Error, Debug)]
pub enum MogrifyError {
    /// 정규식 패턴 컴파일 실패
    #[error("Failed to compile pattern '{pattern}' for mogrifier {}: {source}", entry_label(.position, .key))]
    PatternCompile {
        position: usize,
        key: Option<String>,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// 템플릿이 패턴에 없는 캡처 그룹을 참조
    #[error(
        "Template '{template}' of mogrifier {} references ${index}, but the pattern only captures $0..${}",
        entry_label(.position, .key),
        .available.saturating_sub(1)
    )]
    IndexOutOfRange {
        position: usize,
        key: Option<String>,
        template: String,
        index: usize,
        available: usize,
    },
}

impl MogrifyError {
    /// Configuration position of the entry that failed
    pub fn position(&self) -> usize {
        match self {
            MogrifyError::PatternCompile { position, .. }
            | MogrifyError::IndexOutOfRange { position, .. } => *position,
        }
    }

    /// Key of the entry that failed, if it has one
    pub fn key(&self) -> Option<&str> {
        match self {
            MogrifyError::PatternCompile { key, .. } | MogrifyError::IndexOutOfRange { key, .. } => {
                key.as_deref()
            }
        }
    }
}

/// DogStatsD line parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsdError {
    /// 빈 라인
    #[error("Empty line")]
    Empty,

    /// 이벤트(_e) 또는 서비스 체크(_sc) 라인
    #[error("Not a metric line (event or service check)")]
    NotAMetric,

    /// 메트릭 이름 누락
    #[error("Missing metric name in '{0}'")]
    MissingName(String),

    /// 값 누락
    #[error("Missing metric value in '{0}'")]
    MissingValue(String),

    /// 타입 누락
    #[error("Missing metric type in '{0}'")]
    MissingType(String),

    /// 알 수 없는 타입
    #[error("Unknown metric type '{0}', expected one of: c, g, h, ms, s, d")]
    UnknownType(String),
}

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Mogrifier construction error
    #[error("Mogrifier error: {0}")]
    Mogrify(#[from] MogrifyError),

    /// Report serialization error
    #[error("Failed to render output: {0}")]
    Render(String),

    /// I/O error on the line stream
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

fn entry_label(position: &usize, key: &Option<String>) -> String {
    match key {
        Some(key) => format!("#{} ({})", position, key),
        None => format!("#{}", position),
    }
}
