//! A single compiled mogrifier
//!
//! Binds one compiled regex to a name template and a set of tag templates.

use regex::Regex;
use serde::Serialize;

use super::spec::MogrifierSpec;
use super::template::Template;
use crate::error::{MogrifyError, TemplateError};

/// Result of mogrifying a metric name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mogrified {
    /// Rewritten metric name
    pub name: String,
    /// Derived `key:value` tags
    pub tags: Vec<String>,
}

impl Mogrified {
    /// The name passed through unchanged, with no tags
    pub fn unchanged(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tags: Vec::new(),
        }
    }

    /// Split into `(name, tags)`
    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.name, self.tags)
    }
}

/// Compiled mogrifier
///
/// Immutable once built. Tag templates are kept in ascending key order so
/// tags are emitted deterministically.
#[derive(Debug, Clone)]
pub struct Mogrifier {
    position: usize,
    key: Option<String>,
    matcher: Regex,
    name: Template,
    tags: Vec<(String, Template)>,
}

impl Mogrifier {
    /// Compile a specification
    ///
    /// # Errors
    ///
    /// - `MogrifyError::PatternCompile` if the pattern is not a valid regex
    /// - `MogrifyError::IndexOutOfRange` if the name or a tag template
    ///   references a capture group the pattern does not have
    pub fn from_spec(position: usize, spec: MogrifierSpec) -> Result<Self, MogrifyError> {
        let MogrifierSpec {
            key,
            pattern,
            name,
            tags,
        } = spec;

        let matcher = match Regex::new(&pattern) {
            Ok(regex) => regex,
            Err(source) => {
                return Err(MogrifyError::PatternCompile {
                    position,
                    key,
                    pattern,
                    source,
                })
            }
        };

        let available = matcher.captures_len();
        let name = Template::parse(name);
        let tags: Vec<(String, Template)> = tags
            .into_iter()
            .map(|(tag_key, value)| (tag_key, Template::parse(value)))
            .collect();

        let templates = std::iter::once(&name).chain(tags.iter().map(|(_, t)| t));
        for template in templates {
            if let Err(TemplateError::IndexOutOfRange { index, available }) =
                template.check(available)
            {
                return Err(MogrifyError::IndexOutOfRange {
                    position,
                    key,
                    template: template.as_str().to_string(),
                    index,
                    available,
                });
            }
        }

        Ok(Self {
            position,
            key,
            matcher,
            name,
            tags,
        })
    }

    /// Apply the mogrifier to a metric name
    ///
    /// Returns `None` if the pattern does not match. An expansion failure
    /// is logged and also treated as no match.
    pub fn apply(&self, name: &str) -> Option<Mogrified> {
        match self.try_apply(name) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(
                    mogrifier = self.position,
                    key = ?self.key,
                    pattern = %self.matcher.as_str(),
                    metric = %name,
                    error = %e,
                    "Template expansion failed, treating as no match"
                );
                None
            }
        }
    }

    /// Apply the mogrifier, surfacing expansion failures
    pub fn try_apply(&self, name: &str) -> Result<Option<Mogrified>, TemplateError> {
        let Some(captures) = self.matcher.captures(name) else {
            return Ok(None);
        };

        let new_name = self.name.expand_captures(&captures)?;
        let mut tags = Vec::with_capacity(self.tags.len());
        for (key, template) in &self.tags {
            let value = template.expand_captures(&captures)?;
            tags.push(format!("{}:{}", key, value));
        }

        Ok(Some(Mogrified {
            name: new_name,
            tags,
        }))
    }

    /// Position in configuration order
    pub fn position(&self) -> usize {
        self.position
    }

    /// Configured key, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Source pattern
    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }

    /// Name template
    pub fn name_template(&self) -> &Template {
        &self.name
    }

    /// Tag templates in emission order
    pub fn tag_templates(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.tags.iter().map(|(k, t)| (k.as_str(), t))
    }
}
