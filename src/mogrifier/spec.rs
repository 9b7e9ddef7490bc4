//! Mogrifier specifications
//!
//! A specification is the raw, uncompiled form of a mogrifier as it comes
//! out of configuration: a pattern, a name template and tag templates.
//!
//! # Example Configuration (YAML)
//!
//! ```yaml
//! key: job_ids
//! pattern: '^jobs\.(\d+)\.duration$'
//! name: jobs.duration
//! tags:
//!   job_id: "$1"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Uncompiled mogrifier definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MogrifierSpec {
    /// Optional identifier used in error messages and logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Regex matched against the incoming metric name
    pub pattern: String,

    /// Output name template (supports `$0`, `$1`, ...)
    #[serde(default)]
    pub name: String,

    /// Tag key to tag value template
    ///
    /// Tags are emitted in key order.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl MogrifierSpec {
    /// Create a specification with no tags
    pub fn new(pattern: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: None,
            pattern: pattern.into(),
            name: name.into(),
            tags: BTreeMap::new(),
        }
    }

    /// Set the identifying key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add a tag template
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}
