use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SkillError;

/// Operating system family the command runs on.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    Darwin,
    Unknown,
}

impl Platform {
    /// Platform of the running binary, fixed at compile time.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS`-style name. Anything unrecognized is `Unknown`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            "macos" => Self::Darwin,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Linux => "Linux",
            Self::Darwin => "Darwin",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shell used to run commands.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Cmd,
    Powershell,
    Pwsh,
    Bash,
    Sh,
}

impl Shell {
    pub const ALL: [Shell; 5] = [
        Shell::Cmd,
        Shell::Powershell,
        Shell::Pwsh,
        Shell::Bash,
        Shell::Sh,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cmd => "cmd",
            Self::Powershell => "powershell",
            Self::Pwsh => "pwsh",
            Self::Bash => "bash",
            Self::Sh => "sh",
        }
    }

    /// Program and leading arguments; the command string is appended as the final argument.
    pub fn command_prefix(&self) -> [&'static str; 2] {
        match self {
            Self::Cmd => ["cmd", "/c"],
            Self::Powershell => ["powershell", "-Command"],
            Self::Pwsh => ["pwsh", "-Command"],
            Self::Bash => ["bash", "-c"],
            Self::Sh => ["sh", "-c"],
        }
    }

    pub fn is_posix(&self) -> bool {
        matches!(self, Self::Bash | Self::Sh)
    }

    pub fn is_powershell(&self) -> bool {
        matches!(self, Self::Powershell | Self::Pwsh)
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Shell {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|shell| shell.as_str() == wanted)
            .ok_or_else(|| SkillError::UnknownShell(s.to_string()))
    }
}

/// Platform and shell a command result was produced under.
///
/// Always passed explicitly to the interpreter; nothing in the crate caches
/// a detected context globally.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PlatformContext {
    pub platform: Platform,
    pub shell: Shell,
}

impl PlatformContext {
    pub fn new(platform: Platform, shell: Shell) -> Self {
        Self { platform, shell }
    }
}

/// Result of probing the host for a usable shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    pub context: PlatformContext,
    pub shell_available: bool,
}

/// Detect the host platform and its preferred shell.
pub fn detect() -> PlatformInfo {
    detect_with(Platform::current(), which_exists)
}

/// Detected platform with an optional forced shell (from config).
pub fn resolve(forced: Option<Shell>) -> PlatformInfo {
    match forced {
        Some(shell) => PlatformInfo {
            context: PlatformContext::new(Platform::current(), shell),
            shell_available: which_exists(shell.as_str()),
        },
        None => detect(),
    }
}

/// Detection with an injectable PATH probe.
pub fn detect_with(platform: Platform, exists: impl Fn(&str) -> bool) -> PlatformInfo {
    let found = |shell: Shell| {
        exists(shell.as_str()).then_some(PlatformInfo {
            context: PlatformContext::new(platform, shell),
            shell_available: true,
        })
    };
    let missing = |shell: Shell| PlatformInfo {
        context: PlatformContext::new(platform, shell),
        shell_available: false,
    };

    match platform {
        // cmd ships with every Windows install.
        Platform::Windows => found(Shell::Pwsh)
            .or_else(|| found(Shell::Powershell))
            .unwrap_or(PlatformInfo {
                context: PlatformContext::new(platform, Shell::Cmd),
                shell_available: true,
            }),
        Platform::Linux | Platform::Darwin => found(Shell::Bash)
            .or_else(|| found(Shell::Sh))
            .unwrap_or_else(|| missing(Shell::Sh)),
        Platform::Unknown => missing(Shell::Sh),
    }
}

/// Availability of every supported shell on this host, keyed by shell name.
pub fn available_shells() -> BTreeMap<String, bool> {
    available_shells_with(which_exists)
}

pub fn available_shells_with(exists: impl Fn(&str) -> bool) -> BTreeMap<String, bool> {
    Shell::ALL
        .into_iter()
        .map(|shell| (shell.as_str().to_string(), exists(shell.as_str())))
        .collect()
}

/// Check if an executable exists in PATH.
fn which_exists(name: &str) -> bool {
    let probe = if cfg!(windows) { "where" } else { "which" };
    std::process::Command::new(probe)
        .arg(name)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}
