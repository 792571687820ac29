pub mod batch;
pub mod shell;

use std::collections::HashMap;
use std::time::Duration;

use crate::config::MAX_TIMEOUT_SECS;
use crate::error::SkillError;

/// One command to run through the configured shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Command text, handed to the shell verbatim (`bash -c <command>`).
    pub command: String,
    /// Working directory for the child process (inherits ours when None).
    pub working_dir: Option<String>,
    /// Wall-clock limit; the process group is killed when it expires.
    pub timeout: Duration,
    /// Extra environment variables layered over the inherited environment.
    pub env: HashMap<String, String>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>, timeout_secs: u64) -> Result<Self, SkillError> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(SkillError::InvalidRequest(
                "command must not be empty".to_string(),
            ));
        }
        if timeout_secs == 0 || timeout_secs > MAX_TIMEOUT_SECS {
            return Err(SkillError::InvalidTimeout {
                got: timeout_secs,
                max: MAX_TIMEOUT_SECS,
            });
        }
        Ok(Self {
            command,
            working_dir: None,
            timeout: Duration::from_secs(timeout_secs),
            env: HashMap::new(),
        })
    }

    pub fn with_working_dir(mut self, working_dir: Option<String>) -> Self {
        self.working_dir = working_dir.filter(|wd| !wd.trim().is_empty());
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}
