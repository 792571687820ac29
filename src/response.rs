use rmcp::model::{CallToolResult, Content};
use serde::Serialize;

use crate::platform::{Platform, Shell};

/// Tool response envelope.
/// All tools return Content::text(json_string); `content` itself is a string
/// (JSON-encoded ParsedResult(s) or a plain-text summary).
#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub status: &'static str,
    pub content: String,
    pub content_type: &'static str,
    pub metadata: ToolMetadata,
}

#[derive(Debug, Serialize)]
pub struct ToolMetadata {
    pub tool_name: String,
    pub platform: Platform,
    pub shell: Shell,
    /// Commands actually run (a stopped batch runs fewer than requested).
    pub commands_run: usize,
    #[serde(serialize_with = "serialize_finite_f64")]
    pub duration_seconds: f64,
}

/// Serialize f64, clamping non-finite values (NaN, Inf) to 0.0.
fn serialize_finite_f64<S: serde::Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(if v.is_finite() { *v } else { 0.0 })
}

impl ToolResponse {
    pub fn success(content: String, content_type: &'static str, metadata: ToolMetadata) -> Self {
        Self {
            status: "success",
            content,
            content_type,
            metadata,
        }
    }

    /// The tool ran but at least one command failed; details are in `content`.
    pub fn error(content: String, content_type: &'static str, metadata: ToolMetadata) -> Self {
        Self {
            status: "error",
            content,
            content_type,
            metadata,
        }
    }

    /// Convert to MCP CallToolResult.
    /// Always returns success at the MCP transport level: a failing shell
    /// command is data for the agent, not a protocol error. The outcome is in
    /// the JSON payload (`"status": "error"`).
    pub fn into_call_tool_result(self) -> CallToolResult {
        match serde_json::to_string(&self) {
            Ok(json) => CallToolResult::success(vec![Content::text(json)]),
            Err(e) => {
                let escaped = e.to_string().replace('\\', "\\\\").replace('"', "\\\"");
                CallToolResult::success(vec![Content::text(format!(
                    r#"{{"status":"error","content":"serialization failed: {escaped}","content_type":"text","metadata":{{}}}}"#
                ))])
            }
        }
    }
}
