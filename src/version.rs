//! Loose dotted version ordering.
//!
//! A version string is split into numeric runs, lowercase alphabetic runs and
//! any other leftover text; dots only separate. Numeric segments compare as
//! integers and sort before text segments, and a strict prefix sorts lower,
//! so `1.10 > 1.9`, `1.5 < 1.5.0` and `7.2.1511 > 7.2`.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static COMPONENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+|[a-z]+|\.").expect("static regex")
});

/// One comparable piece of a version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Num(u64),
    Text(String),
}

impl Segment {
    fn parse(token: &str) -> Self {
        token
            .parse::<u64>()
            .map(Segment::Num)
            .unwrap_or_else(|_| Segment::Text(token.to_string()))
    }
}

/// A parsed version; equality and ordering look only at segments.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

impl Version {
    pub fn parse(raw: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for m in COMPONENT_RE.find_iter(raw) {
            if m.start() > last {
                segments.push(Segment::Text(raw[last..m.start()].to_string()));
            }
            if m.as_str() != "." {
                segments.push(Segment::parse(m.as_str()));
            }
            last = m.end();
        }
        if last < raw.len() {
            segments.push(Segment::Text(raw[last..].to_string()));
        }

        Self {
            raw: raw.to_string(),
            segments,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

/// True when `version` is at least `minimum`.
pub fn meets_minimum(version: &str, minimum: &str) -> bool {
    Version::parse(version) >= Version::parse(minimum)
}
