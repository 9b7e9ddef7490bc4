//! Capture group templates
//!
//! A template is a string with `$<index>` placeholders that are replaced
//! by regex capture groups: `$0` is the whole match, `$1` the first
//! subgroup, and so on.
//!
//! A `$` that is not followed by a digit (`$x`, a trailing `$`) is not a
//! placeholder and is copied through literally.
//!
//! # Example
//!
//! ```ignore
//! use statsd_mogrifier::mogrifier::Template;
//!
//! let template = Template::parse("jobs.$1.duration");
//! assert_eq!(template.expand(&["jobs.42", "42"])?, "jobs.42.duration");
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;

/// Matches `$0`, `$1`, ... placeholders (ASCII digits only)
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$[0-9]+").expect("invalid placeholder regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Group(usize),
}

/// A parsed name or tag template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template string
    ///
    /// Parsing never fails. An index too large for `usize` is kept as
    /// `usize::MAX`, which no pattern can satisfy, so it is reported as out
    /// of range when the template is validated or expanded.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut segments = Vec::new();
        let mut last = 0;

        for placeholder in PLACEHOLDER_RE.find_iter(&source) {
            if placeholder.start() > last {
                segments.push(Segment::Literal(
                    source[last..placeholder.start()].to_string(),
                ));
            }
            let index = placeholder.as_str()[1..]
                .parse::<usize>()
                .unwrap_or(usize::MAX);
            segments.push(Segment::Group(index));
            last = placeholder.end();
        }

        if last < source.len() {
            segments.push(Segment::Literal(source[last..].to_string()));
        }

        Self { source, segments }
    }

    /// The raw template text
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the template contains no placeholders
    pub fn is_literal(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Group(_)))
    }

    /// Highest capture group referenced, if any
    pub fn max_group(&self) -> Option<usize> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Group(index) => Some(*index),
                Segment::Literal(_) => None,
            })
            .max()
    }

    /// Check that every placeholder resolves against `available` groups
    /// (group 0 included)
    pub fn check(&self, available: usize) -> Result<(), TemplateError> {
        match self.max_group() {
            Some(index) if index >= available => {
                Err(TemplateError::IndexOutOfRange { index, available })
            }
            _ => Ok(()),
        }
    }

    /// Expand the template against an ordered list of captures
    pub fn expand<'a>(&self, captures: &[&'a str]) -> Result<String, TemplateError> {
        self.render(captures.len(), |index| captures.get(index).copied())
    }

    /// Expand the template against regex captures
    ///
    /// Groups that did not take part in the match expand to an empty string.
    pub fn expand_captures<'h>(
        &self,
        captures: &regex::Captures<'h>,
    ) -> Result<String, TemplateError> {
        self.render(captures.len(), |index| {
            captures.get(index).map(|m| m.as_str())
        })
    }

    fn render<'a>(
        &self,
        available: usize,
        group: impl Fn(usize) -> Option<&'a str>,
    ) -> Result<String, TemplateError> {
        let mut result = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => result.push_str(text),
                Segment::Group(index) => {
                    if *index >= available {
                        return Err(TemplateError::IndexOutOfRange {
                            index: *index,
                            available,
                        });
                    }
                    result.push_str(group(*index).unwrap_or(""));
                }
            }
        }

        Ok(result)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

/// Expand `template` against `captures` in one step
///
/// Convenience wrapper over [`Template::parse`] and [`Template::expand`].
pub fn expand(template: &str, captures: &[&str]) -> Result<String, TemplateError> {
    Template::parse(template).expand(captures)
}
