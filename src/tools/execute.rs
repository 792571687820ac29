use std::collections::HashMap;

use schemars::JsonSchema;
use serde::Deserialize;

use crate::dispatch::CommandRequest;
use crate::dispatch::batch::MAX_BATCH_COMMANDS;
use crate::error::SkillError;
use crate::tools::enums::OutputFormat;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteCommandRequest {
    /// Shell command to execute, e.g. "ls -la /tmp" or "dir C:\\".
    pub command: String,
    /// Working directory for the command (optional). Must exist.
    pub working_dir: Option<String>,
    /// Timeout in seconds (default: 30, max: 600). The process is killed when it expires.
    pub timeout: Option<u64>,
    /// Extra environment variables for the command.
    pub env: Option<HashMap<String, String>>,
    /// "json" (default): structured result with error_type and parsed_data.
    /// "summary": human-readable text.
    pub format: Option<OutputFormat>,
}

impl ExecuteCommandRequest {
    pub fn to_command_request(&self, default_timeout: u64) -> Result<CommandRequest, SkillError> {
        Ok(CommandRequest::new(
            self.command.clone(),
            self.timeout.unwrap_or(default_timeout),
        )?
        .with_working_dir(self.working_dir.clone())
        .with_env(self.env.clone().unwrap_or_default()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteBatchRequest {
    /// Shell commands to execute in order (1 to 50).
    pub commands: Vec<String>,
    /// Working directory shared by every command (optional).
    pub working_dir: Option<String>,
    /// Timeout in seconds per command (default: 30, max: 600).
    pub timeout: Option<u64>,
    /// Extra environment variables for every command.
    pub env: Option<HashMap<String, String>>,
    /// Stop at the first failing command (default: server setting, normally true).
    pub stop_on_failure: Option<bool>,
    /// "json" (default) or "summary".
    pub format: Option<OutputFormat>,
}

impl ExecuteBatchRequest {
    pub fn to_command_requests(
        &self,
        default_timeout: u64,
    ) -> Result<Vec<CommandRequest>, SkillError> {
        if self.commands.is_empty() {
            return Err(SkillError::InvalidRequest(
                "commands must not be empty".to_string(),
            ));
        }
        if self.commands.len() > MAX_BATCH_COMMANDS {
            return Err(SkillError::InvalidRequest(format!(
                "at most {MAX_BATCH_COMMANDS} commands per batch, got {}",
                self.commands.len()
            )));
        }

        let timeout = self.timeout.unwrap_or(default_timeout);
        let env = self.env.clone().unwrap_or_default();
        self.commands
            .iter()
            .enumerate()
            .map(|(i, command)| {
                CommandRequest::new(command.clone(), timeout)
                    .map_err(|e| {
                        SkillError::InvalidRequest(format!("commands[{i}]: {}", e.user_message()))
                    })
                    .map(|req| {
                        req.with_working_dir(self.working_dir.clone())
                            .with_env(env.clone())
                    })
            })
            .collect()
    }
}
