pub mod json;
pub mod key_value;
pub mod table;

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use json::JsonExtractor;
use key_value::KeyValueExtractor;
use table::TableExtractor;

/// Trait for pulling structured data out of command stdout.
/// Each format gets its own implementation; absence is the normal outcome.
pub trait Extractor: Send + Sync {
    fn format(&self) -> Format;

    /// Return the structured value, or `None` when the text is not in this format.
    fn extract(&self, stdout: &str) -> Option<Value>;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Json,
    KeyValue,
    Table,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::KeyValue => "key_value",
            Self::Table => "table",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub format: Format,
    pub data: Value,
}

static JSON: JsonExtractor = JsonExtractor;
static KEY_VALUE: KeyValueExtractor = KeyValueExtractor;
static TABLE: TableExtractor = TableExtractor;

/// Extractors tried left to right; the first hit wins and later ones never run.
pub struct Pipeline {
    stages: Vec<&'static dyn Extractor>,
}

impl Pipeline {
    pub fn new(stages: Vec<&'static dyn Extractor>) -> Self {
        Self { stages }
    }

    pub fn run(&self, stdout: &str) -> Option<Extraction> {
        if stdout.trim().is_empty() {
            return None;
        }
        self.stages.iter().find_map(|stage| {
            stage.extract(stdout).map(|data| Extraction {
                format: stage.format(),
                data,
            })
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        let stages: [&'static dyn Extractor; 3] = [&JSON, &KEY_VALUE, &TABLE];
        Self::new(stages.to_vec())
    }
}

/// Run the standard JSON → key-value → table pipeline.
pub fn extract(stdout: &str) -> Option<Extraction> {
    Pipeline::default().run(stdout)
}

/// Non-blank lines with trailing whitespace and `\r` removed.
pub(crate) fn content_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect()
}
