//! DogStatsD line format
//!
//! Parses and formats single DogStatsD metric lines and applies a
//! [`MogrifierSet`] to them.
//!
//! # Format
//!
//! ```text
//! <name>:<value>|<type>[|@<sample_rate>][|#<tag>,<tag>,...][|<extension>...]
//! ```
//!
//! Extensions such as `c:<container id>` or `T<timestamp>` are carried
//! through untouched. Formatting always writes sample rate, then tags,
//! then extensions.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::StatsdError;
use crate::mogrifier::MogrifierSet;

/// DogStatsD metric type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsdType {
    /// `c`
    Counter,
    /// `g`
    Gauge,
    /// `h`
    Histogram,
    /// `ms`
    Timer,
    /// `s`
    Set,
    /// `d`
    Distribution,
}

impl StatsdType {
    /// Returns the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StatsdType::Counter => "c",
            StatsdType::Gauge => "g",
            StatsdType::Histogram => "h",
            StatsdType::Timer => "ms",
            StatsdType::Set => "s",
            StatsdType::Distribution => "d",
        }
    }
}

impl FromStr for StatsdType {
    type Err = StatsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "c" => Ok(StatsdType::Counter),
            "g" => Ok(StatsdType::Gauge),
            "h" => Ok(StatsdType::Histogram),
            "ms" => Ok(StatsdType::Timer),
            "s" => Ok(StatsdType::Set),
            "d" => Ok(StatsdType::Distribution),
            other => Err(StatsdError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for StatsdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One DogStatsD metric line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsdLine {
    /// Metric name
    pub name: String,
    /// Raw value field (may hold several `:`-separated values)
    pub value: String,
    /// Metric type
    pub metric_type: StatsdType,
    /// Raw sample rate, without the leading `@`
    pub sample_rate: Option<String>,
    /// `key:value` (or bare) tags
    pub tags: Vec<String>,
    /// Any other `|`-separated sections, verbatim
    pub extensions: Vec<String>,
}

impl StatsdLine {
    /// Parse a single line
    ///
    /// # Errors
    ///
    /// Returns a `StatsdError` if the line is empty, is an event or
    /// service check, or lacks a name, value or valid type.
    pub fn parse(line: &str) -> Result<Self, StatsdError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(StatsdError::Empty);
        }
        if line.starts_with("_e{") || line.starts_with("_sc|") {
            return Err(StatsdError::NotAMetric);
        }

        let (name, rest) = line
            .split_once(':')
            .ok_or_else(|| StatsdError::MissingValue(line.to_string()))?;
        if name.is_empty() {
            return Err(StatsdError::MissingName(line.to_string()));
        }

        let mut sections = rest.split('|');
        let value = sections.next().unwrap_or_default();
        if value.is_empty() {
            return Err(StatsdError::MissingValue(line.to_string()));
        }

        let metric_type = match sections.next() {
            Some(t) if !t.is_empty() => t.parse::<StatsdType>()?,
            _ => return Err(StatsdError::MissingType(line.to_string())),
        };

        let mut parsed = StatsdLine {
            name: name.to_string(),
            value: value.to_string(),
            metric_type,
            sample_rate: None,
            tags: Vec::new(),
            extensions: Vec::new(),
        };

        for section in sections {
            if let Some(rate) = section.strip_prefix('@') {
                parsed.sample_rate = Some(rate.to_string());
            } else if let Some(tags) = section.strip_prefix('#') {
                parsed.tags.extend(
                    tags.split(',')
                        .filter(|t| !t.is_empty())
                        .map(str::to_string),
                );
            } else if !section.is_empty() {
                parsed.extensions.push(section.to_string());
            }
        }

        Ok(parsed)
    }

    /// Rename the metric and append derived tags
    ///
    /// Existing tags are kept in front of the derived ones.
    pub fn mogrify(mut self, set: &MogrifierSet) -> Self {
        let (name, tags) = set.mogrify(&self.name).into_parts();
        self.name = name;
        self.tags.extend(tags);
        self
    }
}

impl FromStr for StatsdLine {
    type Err = StatsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StatsdLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}|{}", self.name, self.value, self.metric_type)?;
        if let Some(rate) = &self.sample_rate {
            write!(f, "|@{}", rate)?;
        }
        if !self.tags.is_empty() {
            write!(f, "|#{}", self.tags.join(","))?;
        }
        for extension in &self.extensions {
            write!(f, "|{}", extension)?;
        }
        Ok(())
    }
}

/// Mogrify one raw line
///
/// # Errors
///
/// Returns a `StatsdError` if the line cannot be parsed.
pub fn rewrite_line(set: &MogrifierSet, line: &str) -> Result<String, StatsdError> {
    Ok(StatsdLine::parse(line)?.mogrify(set).to_string())
}

/// Counters from a [`rewrite_stream`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Lines read
    pub lines: u64,
    /// Lines whose name was changed or gained tags
    pub rewritten: u64,
    /// Lines passed through because they could not be parsed
    pub passed_through: u64,
}

/// Mogrify every line of `reader` into `writer`
///
/// Lines that are not parseable metrics (events, service checks, garbage)
/// are written unchanged.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
pub fn rewrite_stream<R, W>(
    set: &MogrifierSet,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<RewriteStats>
where
    R: BufRead,
    W: Write,
{
    let mut stats = RewriteStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines += 1;

        let raw = buf
            .strip_suffix(b"\n")
            .map(|b| b.strip_suffix(b"\r").unwrap_or(b))
            .unwrap_or(&buf);

        let line = match std::str::from_utf8(raw) {
            Ok(line) => line,
            Err(e) => {
                tracing::debug!(error = %e, "Passing non UTF-8 line through unchanged");
                stats.passed_through += 1;
                writer.write_all(raw)?;
                writer.write_all(b"\n")?;
                continue;
            }
        };

        match StatsdLine::parse(line) {
            Ok(parsed) => {
                let original_name = parsed.name.clone();
                let original_tags = parsed.tags.len();
                let mogrified = parsed.mogrify(set);
                if mogrified.name != original_name || mogrified.tags.len() != original_tags {
                    stats.rewritten += 1;
                }
                writeln!(writer, "{}", mogrified)?;
            }
            Err(e) => {
                tracing::debug!(line = %line, error = %e, "Passing line through unchanged");
                stats.passed_through += 1;
                writeln!(writer, "{}", line)?;
            }
        }
    }

    writer.flush()?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mogrifier::MogrifierSpec;

    fn job_set() -> MogrifierSet {
        MogrifierSet::build(vec![MogrifierSpec::new(
            r"^jobs\.(\d+)\.duration$",
            "jobs.duration",
        )
        .with_tag("job_id", "$1")])
        .unwrap()
    }

    #[test]
    fn test_statsd_type_round_trip() {
        for t in ["c", "g", "h", "ms", "s", "d"] {
            assert_eq!(t.parse::<StatsdType>().unwrap().as_str(), t);
        }
        assert_eq!(
            "x".parse::<StatsdType>(),
            Err(StatsdError::UnknownType("x".to_string()))
        );
    }

    #[test]
    fn test_parse_minimal() {
        let line = StatsdLine::parse("page.views:1|c").unwrap();
        assert_eq!(line.name, "page.views");
        assert_eq!(line.value, "1");
        assert_eq!(line.metric_type, StatsdType::Counter);
        assert_eq!(line.sample_rate, None);
        assert!(line.tags.is_empty());
        assert!(line.extensions.is_empty());
    }

    #[test]
    fn test_parse_full() {
        let line =
            StatsdLine::parse("req.time:320|ms|@0.5|#env:prod,canary|c:abc123|T1656581400\n")
                .unwrap();
        assert_eq!(line.metric_type, StatsdType::Timer);
        assert_eq!(line.sample_rate.as_deref(), Some("0.5"));
        assert_eq!(line.tags, vec!["env:prod", "canary"]);
        assert_eq!(line.extensions, vec!["c:abc123", "T1656581400"]);
        assert_eq!(
            line.to_string(),
            "req.time:320|ms|@0.5|#env:prod,canary|c:abc123|T1656581400"
        );
    }

    #[test]
    fn test_parse_multi_value() {
        let line = StatsdLine::parse("latency:1:2:3|d").unwrap();
        assert_eq!(line.name, "latency");
        assert_eq!(line.value, "1:2:3");
        assert_eq!(line.to_string(), "latency:1:2:3|d");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(StatsdLine::parse(""), Err(StatsdError::Empty));
        assert_eq!(StatsdLine::parse("   "), Err(StatsdError::Empty));
        assert_eq!(
            StatsdLine::parse("_e{5,4}:title|text"),
            Err(StatsdError::NotAMetric)
        );
        assert_eq!(
            StatsdLine::parse("_sc|db.up|0"),
            Err(StatsdError::NotAMetric)
        );
        assert!(matches!(
            StatsdLine::parse("no_value"),
            Err(StatsdError::MissingValue(_))
        ));
        assert!(matches!(
            StatsdLine::parse(":1|c"),
            Err(StatsdError::MissingName(_))
        ));
        assert!(matches!(
            StatsdLine::parse("a:|c"),
            Err(StatsdError::MissingValue(_))
        ));
        assert!(matches!(
            StatsdLine::parse("a:1"),
            Err(StatsdError::MissingType(_))
        ));
        assert!(matches!(
            StatsdLine::parse("a:1|zz"),
            Err(StatsdError::UnknownType(_))
        ));
    }

    #[test]
    fn test_mogrify_line_appends_tags() {
        let set = job_set();
        let line = StatsdLine::parse("jobs.42.duration:12|ms|#env:prod").unwrap();
        let mogrified = line.mogrify(&set);
        assert_eq!(mogrified.name, "jobs.duration");
        assert_eq!(mogrified.tags, vec!["env:prod", "job_id:42"]);
        assert_eq!(
            mogrified.to_string(),
            "jobs.duration:12|ms|#env:prod,job_id:42"
        );
    }

    #[test]
    fn test_rewrite_line_unmatched() {
        let set = job_set();
        assert_eq!(
            rewrite_line(&set, "other:1|g|@0.1").unwrap(),
            "other:1|g|@0.1"
        );
    }

    #[test]
    fn test_rewrite_stream() {
        let set = job_set();
        let input = "jobs.7.duration:5|ms\n_sc|svc|0\nother:1|c\ngarbage\n";
        let mut output = Vec::new();

        let stats = rewrite_stream(&set, input.as_bytes(), &mut output).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            "jobs.duration:5|ms|#job_id:7\n_sc|svc|0\nother:1|c\ngarbage\n"
        );
        assert_eq!(
            stats,
            RewriteStats {
                lines: 4,
                rewritten: 1,
                passed_through: 2,
            }
        );
    }

    #[test]
    fn test_rewrite_stream_non_utf8_line() {
        let set = job_set();
        let input: &[u8] = b"jobs.1.duration:1|ms\n\xff\xfe:1|c\njobs.2.duration:2|ms\n";
        let mut output = Vec::new();

        let stats = rewrite_stream(&set, input, &mut output).unwrap();

        assert_eq!(
            output,
            b"jobs.duration:1|ms|#job_id:1\n\xff\xfe:1|c\njobs.duration:2|ms|#job_id:2\n"
        );
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.rewritten, 2);
        assert_eq!(stats.passed_through, 1);
    }

    #[test]
    fn test_rewrite_stream_last_line_without_newline() {
        let set = job_set();
        let mut output = Vec::new();

        rewrite_stream(&set, "other:1|c\r\njobs.3.duration:3|ms".as_bytes(), &mut output)
            .unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "other:1|c\njobs.duration:3|ms|#job_id:3\n"
        );
    }
}
