use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error("unknown shell: {0}")]
    UnknownShell(String),

    #[error("invalid precedence: {0}")]
    InvalidPrecedence(String),

    #[error("timeout must be between 1 and {max}s, got {got}s")]
    InvalidTimeout { got: u64, max: u64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to spawn {shell}: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl SkillError {
    /// Returns true when the error came from the caller's input rather than the host.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownShell(_)
                | Self::InvalidPrecedence(_)
                | Self::InvalidTimeout { .. }
                | Self::InvalidRequest(_)
        )
    }

    /// Produce a message safe for returning to MCP clients and for embedding
    /// in a synthesized stderr. Spawn failures are phrased the way a shell
    /// would report them so the classifier buckets them correctly.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownShell(name) => {
                format!("unknown shell: {name} (expected cmd, powershell, pwsh, bash or sh)")
            }
            Self::InvalidPrecedence(msg) => format!("invalid precedence: {msg}"),
            Self::InvalidTimeout { got, max } => {
                format!("timeout must be between 1 and {max} seconds, got {got}")
            }
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Spawn { shell, source } => match source.kind() {
                std::io::ErrorKind::NotFound => format!("{shell}: command not found"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("{shell}: permission denied when trying to execute command")
                }
                _ => format!("unexpected error launching {shell}: {source}"),
            },
            Self::Io(e) => format!("unexpected error: {e}"),
            Self::Other(msg) => msg.clone(),
        }
    }
}
