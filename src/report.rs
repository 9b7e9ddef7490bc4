//! Output for `--validate` and `--dry-run`
//!
//! Reports can be rendered as text, JSON or YAML.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{AppError, AppResult};
use crate::mogrifier::MogrifierSet;

/// Result of `--validate`
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Always true; invalid configurations never produce a report
    pub valid: bool,
    /// Number of compiled mogrifiers
    pub mogrifiers: usize,
}

impl ValidationReport {
    /// Summarize a successfully built set
    pub fn new(set: &MogrifierSet) -> Self {
        Self {
            valid: true,
            mogrifiers: set.len(),
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(format!(
                "Configuration is valid ({} mogrifiers)\n",
                self.mogrifiers
            )),
            _ => render_structured(self, format),
        }
    }
}

/// One configured mogrifier, as shown in a dry run
#[derive(Debug, Clone, Serialize)]
pub struct MogrifierSummary {
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub pattern: String,
    pub name: String,
    pub tags: BTreeMap<String, String>,
}

/// Mogrification result for one name
#[derive(Debug, Clone, Serialize)]
pub struct NameResult {
    pub input: String,
    /// Position of the mogrifier that matched
    pub matched: Option<usize>,
    pub name: String,
    pub tags: Vec<String>,
}

/// Result of `--dry-run`
#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub mogrifiers: Vec<MogrifierSummary>,
    pub results: Vec<NameResult>,
}

impl DryRunReport {
    /// Describe `set` and mogrify each of `names` with it
    pub fn new<S: AsRef<str>>(set: &MogrifierSet, names: &[S]) -> Self {
        let mogrifiers = set
            .iter()
            .map(|m| MogrifierSummary {
                position: m.position(),
                key: m.key().map(str::to_string),
                pattern: m.pattern().to_string(),
                name: m.name_template().to_string(),
                tags: m
                    .tag_templates()
                    .map(|(k, t)| (k.to_string(), t.to_string()))
                    .collect(),
            })
            .collect();

        let results = names
            .iter()
            .map(|input| {
                let input = input.as_ref();
                match set.find(input) {
                    Some((entry, result)) => NameResult {
                        input: input.to_string(),
                        matched: Some(entry.position()),
                        name: result.name,
                        tags: result.tags,
                    },
                    None => NameResult {
                        input: input.to_string(),
                        matched: None,
                        name: input.to_string(),
                        tags: Vec::new(),
                    },
                }
            })
            .collect();

        Self {
            mogrifiers,
            results,
        }
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> AppResult<String> {
        match format {
            OutputFormat::Text => Ok(self.to_string()),
            _ => render_structured(self, format),
        }
    }
}

impl fmt::Display for DryRunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mogrifiers ({}):", self.mogrifiers.len())?;
        for m in &self.mogrifiers {
            match &m.key {
                Some(key) => write!(f, "  #{} [{}]", m.position, key)?,
                None => write!(f, "  #{}", m.position)?,
            }
            write!(f, " {} -> {}", m.pattern, m.name)?;
            if !m.tags.is_empty() {
                let tags: Vec<String> = m.tags.iter().map(|(k, v)| format!("{}:{}", k, v)).collect();
                write!(f, " [{}]", tags.join(","))?;
            }
            writeln!(f)?;
        }

        if !self.results.is_empty() {
            writeln!(f, "Results:")?;
            for r in &self.results {
                write!(f, "  {} -> {}", r.input, r.name)?;
                if !r.tags.is_empty() {
                    write!(f, " [{}]", r.tags.join(","))?;
                }
                match r.matched {
                    Some(position) => writeln!(f, " (mogrifier #{})", position)?,
                    None => writeln!(f, " (no match)")?,
                }
            }
        }

        let matched = self.results.iter().filter(|r| r.matched.is_some()).count();
        writeln!(
            f,
            "Dry run completed: {} valid mogrifiers, {} of {} names matched",
            self.mogrifiers.len(),
            matched,
            self.results.len()
        )
    }
}

fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> AppResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|s| s + "\n")
            .map_err(|e| AppError::Render(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| AppError::Render(e.to_string()))
        }
        OutputFormat::Text => Err(AppError::Render(format!(
            "{} output has no structured form",
            format
        ))),
    }
}
