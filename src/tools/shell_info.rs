use std::collections::BTreeMap;

use serde::Serialize;

use crate::platform::{Platform, PlatformInfo, Shell};

#[derive(Debug, Serialize)]
pub struct ShellInfo {
    /// Operating system (Windows, Linux, Darwin, Unknown).
    pub platform: Platform,
    /// Shell used for execute_command / execute_batch.
    pub shell: Shell,
    pub shell_available: bool,
    /// Every supported shell and whether it is on PATH.
    pub available_shells: BTreeMap<String, bool>,
}

impl ShellInfo {
    pub fn new(info: PlatformInfo, available_shells: BTreeMap<String, bool>) -> Self {
        Self {
            platform: info.context.platform,
            shell: info.context.shell,
            shell_available: info.shell_available,
            available_shells,
        }
    }
}
