use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::extract::{Extractor, Format, content_lines};

/// Column gap for tables without a separator line: two or more blanks, or a tab.
static COLUMN_GAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|\t").expect("valid regex"));

/// Tables narrower than this are headings or lists, not tables.
pub const MIN_COLUMNS: usize = 2;

/// Text tables: `docker ps`, `kubectl get`, markdown/ASCII pipe tables, and
/// underlined `NAME  AGE` / `----  ---` listings.
pub struct TableExtractor;

impl Extractor for TableExtractor {
    fn format(&self) -> Format {
        Format::Table
    }

    fn extract(&self, stdout: &str) -> Option<Value> {
        let mut lines = content_lines(stdout);
        // +----+----+ top border of an ASCII table
        if lines.first().is_some_and(|line| is_separator(line)) {
            lines.remove(0);
        }
        if lines.len() < 2 {
            return None;
        }

        let (headers, rows) = if lines.len() >= 3 && is_separator(lines[1]) {
            split_with_separator(lines[0], lines[1], &lines[2..])?
        } else {
            split_aligned(lines[0], &lines[1..])?
        };

        build_rows(headers, rows)
    }
}

/// A line made only of `-`, `=`, `+`, `|`, `:` and blanks, with at least one rule character.
pub fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.contains(&['-', '='][..])
        && trimmed
            .chars()
            .all(|c| matches!(c, '-' | '=' | '+' | '|' | ':') || c.is_whitespace())
}

type Split = (Vec<String>, Vec<Vec<String>>);

fn split_with_separator(header: &str, separator: &str, body: &[&str]) -> Option<Split> {
    let body: Vec<&str> = body
        .iter()
        .copied()
        .filter(|line| !is_separator(line))
        .collect();
    if body.is_empty() {
        return None;
    }

    if header.contains('|') {
        let headers = split_pipes(header);
        let rows = body.iter().copied().map(split_pipes).collect();
        return Some((headers, rows));
    }

    let starts = column_starts(separator);
    let headers = slice_columns(header, &starts);
    let mut rows = Vec::with_capacity(body.len());
    for line in body {
        if is_aligned(line, &starts) {
            rows.push(slice_columns(line, &starts));
        } else {
            let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if tokens.len() != starts.len() {
                return None;
            }
            rows.push(tokens);
        }
    }
    Some((headers, rows))
}

fn split_aligned(header: &str, body: &[&str]) -> Option<Split> {
    // A rule line anywhere but under the header means this is not a table we understand.
    if body.iter().any(|line| is_separator(line)) {
        return None;
    }
    let split = |line: &str| {
        if header.contains('|') {
            split_pipes(line)
        } else {
            COLUMN_GAP_RE
                .split(line.trim())
                .map(str::to_string)
                .collect::<Vec<_>>()
        }
    };
    Some((split(header), body.iter().copied().map(split).collect()))
}

fn split_pipes(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Character offsets where each rule run of the separator begins.
fn column_starts(separator: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_run = false;
    for (i, c) in separator.chars().enumerate() {
        let rule = !c.is_whitespace();
        if rule && !in_run {
            starts.push(i);
        }
        in_run = rule;
    }
    starts
}

/// Every column boundary falls on a blank (or past the end of the line).
fn is_aligned(line: &str, starts: &[usize]) -> bool {
    let chars: Vec<char> = line.chars().collect();
    starts
        .iter()
        .skip(1)
        .all(|&start| chars.get(start - 1).is_none_or(|c| c.is_whitespace()))
}

fn slice_columns(line: &str, starts: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    (0..starts.len())
        .map(|i| {
            let from = if i == 0 { 0 } else { starts[i].min(chars.len()) };
            let to = starts
                .get(i + 1)
                .map_or(chars.len(), |&next| next.min(chars.len()));
            chars[from..to].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

/// All-or-nothing: any ragged row or unusable header rejects the table.
fn build_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Option<Value> {
    if headers.len() < MIN_COLUMNS || rows.is_empty() {
        return None;
    }
    let mut seen = HashSet::new();
    if headers.iter().any(|h| h.is_empty() || !seen.insert(h.as_str())) {
        return None;
    }
    if rows.iter().any(|row| row.len() != headers.len()) {
        return None;
    }

    let records = rows
        .into_iter()
        .map(|row| {
            let record: Map<String, Value> = headers
                .iter()
                .cloned()
                .zip(row.into_iter().map(Value::String))
                .collect();
            Value::Object(record)
        })
        .collect();
    Some(Value::Array(records))
}
