//! Metric name mogrification
//!
//! This module rewrites metric names using an ordered set of regex rules.
//! Each rule renames the metric and derives tags from capture groups.
//!
//! - [`template`] - `$N` placeholder expansion
//! - [`entry`] - one compiled rule
//! - [`set`] - ordered, first-match-wins collection of rules
//! - [`spec`] - uncompiled rule definitions from configuration
//!
//! # Example
//!
//! ```ignore
//! use statsd_mogrifier::mogrifier::{MogrifierSet, MogrifierSpec};
//!
//! let set = MogrifierSet::build(vec![
//!     MogrifierSpec::new(r"^foo\.(\d+)\.bar$", "foo.bar").with_tag("id", "$1"),
//! ])?;
//!
//! let result = set.mogrify("foo.42.bar");
//! assert_eq!(result.name, "foo.bar");
//! assert_eq!(result.tags, vec!["id:42"]);
//! ```

pub mod entry;
pub mod set;
pub mod spec;
pub mod template;

pub use entry::{Mogrified, Mogrifier};
pub use set::MogrifierSet;
pub use spec::MogrifierSpec;
pub use template::{expand, Template};
