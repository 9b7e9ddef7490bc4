//! Configuration management for statsd-mogrifier
//!
//! Mogrifier definitions can come from a YAML file, from environment
//! variables, or both. Environment entries are appended after file
//! entries, so file rules are tried first.
//!
//! # Environment layout
//!
//! For every key `K` in the configured key list:
//!
//! - `DOG_STATSD_MOGRIFIER_<K>_PATTERN` - regex (required)
//! - `DOG_STATSD_MOGRIFIER_<K>_NAME` - name template (required)
//! - `DOG_STATSD_MOGRIFIER_<K>_TAGS` - `key:template,key:template` (optional)
//!
//! `K` is upper-cased when building variable names.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::MogrifyError;
use crate::mogrifier::{MogrifierSet, MogrifierSpec};

/// Prefix for mogrifier environment variables
pub const ENV_PREFIX: &str = "DOG_STATSD_MOGRIFIER";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Missing or malformed environment variable
    #[error("Failed to load mogrifier {key} from environment: {reason}")]
    EnvError { key: String, reason: String },

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A mogrifier failed to compile
    #[error(transparent)]
    Mogrify(#[from] MogrifyError),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Mogrifiers in the order they are tried
    #[serde(default)]
    pub mogrifiers: Vec<MogrifierSpec>,
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated
    ///
    /// # Note
    /// - If the file doesn't exist, returns `ConfigError::ReadError`
    /// - Use `Config::load_or_default()` if you want fallback to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&contents)?;
        tracing::debug!(
            path = %path.display(),
            mogrifiers = config.mogrifiers.len(),
            "Loaded config file"
        );
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load mogrifiers for `keys` from the process environment
    pub fn from_env<S: AsRef<str>>(keys: &[S]) -> Result<Self, ConfigError> {
        Self::from_lookup(keys, |name| std::env::var(name).ok())
    }

    /// Load mogrifiers for `keys` through an arbitrary variable lookup
    ///
    /// Mogrifiers keep the order of `keys`.
    pub fn from_lookup<S, F>(keys: &[S], lookup: F) -> Result<Self, ConfigError>
    where
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut mogrifiers = Vec::with_capacity(keys.len());

        for key in keys {
            let key = key.as_ref().trim();
            if key.is_empty() {
                continue;
            }

            let prefix = format!("{}_{}", ENV_PREFIX, key.to_uppercase());
            let required = |suffix: &str| {
                let var = format!("{}_{}", prefix, suffix);
                match lookup(&var) {
                    Some(value) if !value.is_empty() => Ok(value),
                    _ => Err(ConfigError::EnvError {
                        key: key.to_string(),
                        reason: format!("{} is not set", var),
                    }),
                }
            };

            let pattern = required("PATTERN")?;
            let name = required("NAME")?;
            let tags = match lookup(&format!("{}_TAGS", prefix)) {
                Some(raw) => parse_tags(key, &raw)?,
                None => BTreeMap::new(),
            };

            mogrifiers.push(MogrifierSpec {
                key: Some(key.to_string()),
                pattern,
                name,
                tags,
            });
        }

        let config = Self { mogrifiers };
        config.validate()?;
        Ok(config)
    }

    /// Append another configuration's mogrifiers after this one's
    pub fn merge(mut self, other: Config) -> Self {
        self.mogrifiers.extend(other.mogrifiers);
        self
    }

    /// Validate the configuration
    ///
    /// Checks structure only; patterns and templates are checked when the
    /// set is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut keys = HashSet::new();

        for (index, spec) in self.mogrifiers.iter().enumerate() {
            if spec.pattern.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Mogrifier {} has an empty pattern",
                    index
                )));
            }

            if spec.name.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "Mogrifier {} has an empty name",
                    index
                )));
            }

            if let Some(key) = &spec.key {
                if !keys.insert(key.as_str()) {
                    return Err(ConfigError::ValidationError(format!(
                        "Duplicate mogrifier key '{}'",
                        key
                    )));
                }
            }
        }

        Ok(())
    }

    /// Validate and compile the configured mogrifiers
    pub fn mogrifier_set(&self) -> Result<MogrifierSet, ConfigError> {
        self.validate()?;
        let set = MogrifierSet::build(self.mogrifiers.iter().cloned())?;
        tracing::info!(mogrifiers = set.len(), "Mogrifiers loaded");
        Ok(set)
    }
}

/// Parse `key:value,key:value` into a tag map
///
/// Values may contain `:`; only the first one separates key and value.
fn parse_tags(key: &str, raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut tags = BTreeMap::new();

    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once(':') {
            Some((tag_key, value)) if !tag_key.is_empty() => {
                tags.insert(tag_key.to_string(), value.to_string());
            }
            _ => {
                return Err(ConfigError::EnvError {
                    key: key.to_string(),
                    reason: format!("invalid tag '{}', expected key:value", pair),
                })
            }
        }
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mogrifiers.is_empty());
        assert!(config.mogrifier_set().unwrap().is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
mogrifiers:
  - key: jobs
    pattern: '^jobs\.(\d+)\.duration$'
    name: jobs.duration
    tags:
      job_id: "$1"
  - pattern: '^baz$'
    name: qux
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.mogrifiers.len(), 2);
        assert_eq!(config.mogrifiers[0].key.as_deref(), Some("jobs"));
        assert_eq!(config.mogrifiers[1].name, "qux");

        let set = config.mogrifier_set().unwrap();
        let result = set.mogrify("jobs.9.duration");
        assert_eq!(result.name, "jobs.duration");
        assert_eq!(result.tags, vec!["job_id:9"]);
    }

    #[test]
    fn test_config_validation() {
        let config = Config {
            mogrifiers: vec![MogrifierSpec::new("", "name")],
        };
        assert!(config.validate().is_err());

        let config = Config {
            mogrifiers: vec![MogrifierSpec::new("a", "")],
        };
        assert!(config.validate().is_err());

        let config = Config {
            mogrifiers: vec![
                MogrifierSpec::new("a", "A").with_key("dup"),
                MogrifierSpec::new("b", "B").with_key("dup"),
            ],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate mogrifier key 'dup'"));
    }

    #[test]
    fn test_mogrifier_set_surfaces_compile_error() {
        let config = Config {
            mogrifiers: vec![MogrifierSpec::new("(", "x")],
        };
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.mogrifier_set(),
            Err(ConfigError::Mogrify(MogrifyError::PatternCompile { .. }))
        ));
    }

    #[test]
    fn test_from_lookup() {
        let vars = lookup(&[
            ("DOG_STATSD_MOGRIFIER_JOBS_PATTERN", r"^jobs\.(\d+)\.(\w+)$"),
            ("DOG_STATSD_MOGRIFIER_JOBS_NAME", "jobs.$2"),
            ("DOG_STATSD_MOGRIFIER_JOBS_TAGS", "job_id:$1,source:legacy"),
            ("DOG_STATSD_MOGRIFIER_USERS_PATTERN", r"^users\.(\d+)$"),
            ("DOG_STATSD_MOGRIFIER_USERS_NAME", "users"),
        ]);

        let config = Config::from_lookup(&["jobs", "users"], vars).unwrap();
        assert_eq!(config.mogrifiers.len(), 2);

        let jobs = &config.mogrifiers[0];
        assert_eq!(jobs.key.as_deref(), Some("jobs"));
        assert_eq!(jobs.name, "jobs.$2");
        assert_eq!(jobs.tags.get("job_id"), Some(&"$1".to_string()));
        assert_eq!(jobs.tags.get("source"), Some(&"legacy".to_string()));
        assert!(config.mogrifiers[1].tags.is_empty());

        let set = config.mogrifier_set().unwrap();
        let result = set.mogrify("jobs.3.retries");
        assert_eq!(result.name, "jobs.retries");
        assert_eq!(result.tags, vec!["job_id:3", "source:legacy"]);
    }

    #[test]
    fn test_from_lookup_missing_pattern() {
        let vars = lookup(&[("DOG_STATSD_MOGRIFIER_JOBS_NAME", "jobs")]);
        let err = Config::from_lookup(&["jobs"], vars).unwrap_err();
        match err {
            ConfigError::EnvError { key, reason } => {
                assert_eq!(key, "jobs");
                assert!(reason.contains("DOG_STATSD_MOGRIFIER_JOBS_PATTERN"));
            }
            other => panic!("Expected EnvError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_lookup_bad_tags() {
        let vars = lookup(&[
            ("DOG_STATSD_MOGRIFIER_X_PATTERN", "x"),
            ("DOG_STATSD_MOGRIFIER_X_NAME", "x"),
            ("DOG_STATSD_MOGRIFIER_X_TAGS", "ok:1,broken"),
        ]);
        let err = Config::from_lookup(&["x"], vars).unwrap_err();
        assert!(err.to_string().contains("invalid tag 'broken'"));
    }

    #[test]
    fn test_from_lookup_skips_blank_keys() {
        let config = Config::from_lookup(&["", "  "], lookup(&[])).unwrap();
        assert!(config.mogrifiers.is_empty());
    }

    #[test]
    fn test_parse_tags_value_with_colon() {
        let tags = parse_tags("k", "url:http://x, env:prod ,").unwrap();
        assert_eq!(tags.get("url"), Some(&"http://x".to_string()));
        assert_eq!(tags.get("env"), Some(&"prod".to_string()));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_merge_keeps_file_entries_first() {
        let file = Config {
            mogrifiers: vec![MogrifierSpec::new("^m$", "from_file")],
        };
        let env = Config {
            mogrifiers: vec![MogrifierSpec::new("^m$", "from_env").with_key("m")],
        };

        let merged = file.merge(env);
        assert_eq!(merged.mogrifiers.len(), 2);
        assert_eq!(merged.mogrifier_set().unwrap().mogrify("m").name, "from_file");
    }
}
