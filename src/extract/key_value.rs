use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::extract::{Extractor, Format, content_lines};

/// `KEY=VALUE`, spaces around `=` allowed, VALUE may be empty.
static ASSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*=\s*(.*?)\s*$").expect("valid regex")
});

/// `KEY: VALUE`, whitespace after the colon and a non-empty VALUE required.
/// The whitespace requirement keeps `scheme://host` from reading as a pair.
static COLON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9_][A-Za-z0-9_.\-]*)\s*:\s+(\S.*?)\s*$").expect("valid regex")
});

/// Minimum matching lines for a document to count as key-value output.
pub const MIN_PAIRS: usize = 2;

pub struct KeyValueExtractor;

impl Extractor for KeyValueExtractor {
    fn format(&self) -> Format {
        Format::KeyValue
    }

    fn extract(&self, stdout: &str) -> Option<Value> {
        let lines = content_lines(stdout);
        let pairs: Vec<(&str, &str)> = lines.iter().copied().filter_map(parse_pair).collect();

        // Strict majority of non-blank lines, so one stray "x: y" line in prose is ignored.
        if pairs.len() < MIN_PAIRS || pairs.len() * 2 <= lines.len() {
            return None;
        }

        let mut map = Map::new();
        for (key, value) in pairs {
            // Map keeps the first position of a key; the last value wins.
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
        Some(Value::Object(map))
    }
}

fn parse_pair(line: &str) -> Option<(&str, &str)> {
    let caps = ASSIGN_RE
        .captures(line)
        .or_else(|| COLON_RE.captures(line))?;
    let key = caps.get(1)?.as_str();
    let value = caps.get(2).map_or("", |m| m.as_str());
    Some((key, value))
}
