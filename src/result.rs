use serde::Serialize;
use serde_json::Value;

use crate::classify::ErrorType;
use crate::error::SkillError;
use crate::platform::{Platform, Shell};

/// Characters of stdout/stderr shown in a summary before truncation.
pub const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Completed command run as handed over by the execution adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExecutionResult {
    /// Platform-native exit status. Not meaningful when `timed_out` is set.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl RawExecutionResult {
    pub fn new(
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
        timed_out: bool,
    ) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            timed_out,
        }
    }

    /// Build from raw pipe bytes. Invalid UTF-8 is replaced, never rejected.
    pub fn from_bytes(exit_code: i32, stdout: &[u8], stderr: &[u8], timed_out: bool) -> Self {
        Self {
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            timed_out,
        }
    }

    pub fn timed_out(timeout_secs: u64) -> Self {
        Self::new(
            -1,
            "",
            format!("Command timed out after {timeout_secs} seconds"),
            true,
        )
    }

    /// A command that never started. The error text becomes stderr so it is
    /// classified like any other failure.
    pub fn launch_failed(err: &SkillError) -> Self {
        Self::new(-1, "", err.user_message(), false)
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0 && !self.timed_out
    }
}

/// Interpreted command result returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub platform: Platform,
    pub shell: Shell,
    pub error_type: ErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<Value>,
}

impl ParsedResult {
    /// Human-readable rendering for callers that do not want JSON.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Exit Code: {}", self.exit_code),
            format!("Platform: {}", self.platform),
            format!("Shell: {}", self.shell),
            format!("Success: {}", self.success),
        ];

        if self.error_type != ErrorType::None {
            lines.push(format!("Error Type: {}", self.error_type));
        }

        if let Some(preview) = preview(&self.stdout) {
            lines.push(format!("\nStdout:\n{preview}"));
        }
        if let Some(preview) = preview(&self.stderr) {
            lines.push(format!("\nStderr:\n{preview}"));
        }

        if let Some(data) = &self.parsed_data
            && let Ok(pretty) = serde_json::to_string_pretty(data)
        {
            lines.push(format!("\nParsed Data:\n{pretty}"));
        }

        lines.join("\n")
    }
}

fn preview(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut out: String = trimmed.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    if trimmed.chars().count() > SUMMARY_PREVIEW_CHARS {
        out.push_str("...");
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lossy_decoding_keeps_valid_text() {
        let raw = RawExecutionResult::from_bytes(0, b"ok \xff\xfe done", b"", false);
        assert!(raw.stdout.starts_with("ok "));
        assert!(raw.stdout.ends_with(" done"));
        assert!(raw.stdout.contains('\u{FFFD}'));
    }

    #[test]
    fn timed_out_result_is_never_successful() {
        let raw = RawExecutionResult::timed_out(5);
        assert!(raw.timed_out);
        assert!(!raw.success());
        assert_eq!(raw.stderr, "Command timed out after 5 seconds");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(SUMMARY_PREVIEW_CHARS + 10);
        let out = preview(&long).unwrap();
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), SUMMARY_PREVIEW_CHARS + 3);
        assert_eq!(preview("   \n"), None);
    }
}
