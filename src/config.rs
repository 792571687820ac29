use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::classify::{Category, Precedence};
use crate::error::SkillError;
use crate::platform::Shell;

pub const DEFAULT_CONFIG_PATH: &str = "bash-skill.toml";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// MCP request ceiling.
pub const MAX_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 2 * 1024 * 1024; // 2MB

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}

fn default_true() -> bool {
    true
}

fn default_precedence() -> Vec<Category> {
    Category::ALL.to_vec()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Force a shell instead of detecting one.
    #[serde(default)]
    pub shell: Option<Shell>,
    #[serde(default = "default_timeout")]
    pub default_timeout_secs: u64,
    /// Per-stream cap on captured stdout/stderr.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    #[serde(default = "default_true")]
    pub stop_batch_on_failure: bool,
    /// Order in which overlapping stderr categories are resolved.
    #[serde(default = "default_precedence")]
    pub precedence: Vec<Category>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: None,
            default_timeout_secs: default_timeout(),
            max_output_bytes: default_max_output_bytes(),
            stop_batch_on_failure: true,
            precedence: default_precedence(),
        }
    }
}

impl Config {
    /// Load from `BASH_SKILL_CONFIG` (or `bash-skill.toml`) with env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("BASH_SKILL_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<Self>(&content)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `BASH_SKILL_*` overrides from `lookup`. Unparsable values are skipped.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup("BASH_SKILL_SHELL") {
            match raw.parse::<Shell>() {
                Ok(shell) => self.shell = Some(shell),
                Err(e) => tracing::warn!("BASH_SKILL_SHELL ignored: {e}"),
            }
        }
        if let Some(raw) = lookup("BASH_SKILL_TIMEOUT") {
            match raw.trim().parse() {
                Ok(secs) => self.default_timeout_secs = secs,
                Err(_) => tracing::warn!("BASH_SKILL_TIMEOUT ignored: not a number: {raw}"),
            }
        }
        if let Some(raw) = lookup("BASH_SKILL_MAX_OUTPUT_BYTES") {
            match raw.trim().parse() {
                Ok(bytes) => self.max_output_bytes = bytes,
                Err(_) => {
                    tracing::warn!("BASH_SKILL_MAX_OUTPUT_BYTES ignored: not a number: {raw}")
                }
            }
        }
        if let Some(raw) = lookup("BASH_SKILL_STOP_ON_FAILURE") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.stop_batch_on_failure = true,
                "0" | "false" | "no" => self.stop_batch_on_failure = false,
                _ => tracing::warn!("BASH_SKILL_STOP_ON_FAILURE ignored: {raw}"),
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.default_timeout_secs == 0 || self.default_timeout_secs > MAX_TIMEOUT_SECS {
            anyhow::bail!(
                "default_timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}, got {}",
                self.default_timeout_secs
            );
        }
        if self.max_output_bytes == 0 {
            anyhow::bail!("max_output_bytes must be greater than zero");
        }
        self.precedence()?;
        Ok(())
    }

    pub fn precedence(&self) -> Result<Precedence, SkillError> {
        Precedence::new(self.precedence.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_fields_parse() {
        let config: Config = toml::from_str(
            r#"
shell = "sh"
default_timeout_secs = 90
stop_batch_on_failure = false
precedence = ["syntax_error", "permission_denied", "command_not_found"]
"#,
        )
        .unwrap();
        assert_eq!(config.shell, Some(Shell::Sh));
        assert_eq!(config.default_timeout_secs, 90);
        assert!(!config.stop_batch_on_failure);
        assert_eq!(config.precedence[0], Category::SyntaxError);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<Config>("shel = \"sh\"").is_err());
    }

    #[test]
    fn overrides_apply_and_bad_values_are_skipped() {
        let mut config = Config::default();
        config.apply_overrides(|key| match key {
            "BASH_SKILL_SHELL" => Some("PWSH".to_string()),
            "BASH_SKILL_TIMEOUT" => Some("soon".to_string()),
            "BASH_SKILL_STOP_ON_FAILURE" => Some("no".to_string()),
            _ => None,
        });
        assert_eq!(config.shell, Some(Shell::Pwsh));
        assert_eq!(config.default_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!config.stop_batch_on_failure);
    }

    #[test]
    fn validate_rejects_bad_precedence_and_timeout() {
        let config = Config {
            precedence: vec![Category::SyntaxError],
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            default_timeout_secs: MAX_TIMEOUT_SECS + 1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
