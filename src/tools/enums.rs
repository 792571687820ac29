use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a command result is rendered in the tool response.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full structured result as JSON, including parsed_data.
    #[default]
    Json,
    /// Human-readable summary with truncated stdout/stderr previews.
    #[serde(alias = "text")]
    Summary,
}

impl OutputFormat {
    /// `content_type` of the response envelope.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Summary => "text",
        }
    }
}
