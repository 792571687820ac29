use std::sync::Arc;
use std::time::Instant;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::classify::ErrorClassifier;
use crate::config::Config;
use crate::dispatch::CommandRequest;
use crate::dispatch::shell::ShellDispatch;
use crate::error::SkillError;
use crate::interpret::Interpreter;
use crate::platform::{self, PlatformContext, PlatformInfo};
use crate::response::{ToolMetadata, ToolResponse};
use crate::result::ParsedResult;
use crate::tools::enums::OutputFormat;
use crate::tools::execute::{ExecuteBatchRequest, ExecuteCommandRequest};
use crate::tools::shell_info::ShellInfo;

#[derive(Clone)]
pub struct BashSkillServer {
    platform: PlatformInfo,
    dispatch: ShellDispatch,
    interpreter: Arc<Interpreter>,
    default_timeout_secs: u64,
    stop_batch_on_failure: bool,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl BashSkillServer {
    pub fn new(config: Config, platform: PlatformInfo) -> Result<Self, SkillError> {
        let precedence = config.precedence()?;
        let interpreter = Arc::new(Interpreter::new(ErrorClassifier::new(precedence)));
        let dispatch = ShellDispatch::new(platform.context.shell)
            .with_max_output_bytes(config.max_output_bytes);

        if !platform.shell_available {
            tracing::warn!(
                shell = %platform.context.shell,
                "shell not found on PATH, commands will fail to launch"
            );
        }

        Ok(Self {
            platform,
            dispatch,
            interpreter,
            default_timeout_secs: config.default_timeout_secs,
            stop_batch_on_failure: config.stop_batch_on_failure,
            tool_router: Self::tool_router(),
        })
    }

    pub fn context(&self) -> &PlatformContext {
        &self.platform.context
    }

    fn metadata(&self, tool_name: &str, commands_run: usize, start: Instant) -> ToolMetadata {
        ToolMetadata {
            tool_name: tool_name.to_string(),
            platform: self.platform.context.platform,
            shell: self.platform.context.shell,
            commands_run,
            duration_seconds: start.elapsed().as_secs_f64(),
        }
    }

    #[tool(
        name = "execute_command",
        description = "Execute a shell command on the host and get a structured result: exit_code, stdout, stderr, success, error_type (none, command_not_found, permission_denied, syntax_error, runtime_error, timeout) and parsed_data when stdout is JSON, KEY=VALUE lines or a text table. Call `get_shell_info` first to know which shell syntax to use."
    )]
    async fn execute_command(
        &self,
        Parameters(req): Parameters<ExecuteCommandRequest>,
    ) -> Result<CallToolResult, McpError> {
        let start = Instant::now();
        let command_req = req
            .to_command_request(self.default_timeout_secs)
            .map_err(to_mcp_error)?;

        let raw = self.dispatch.execute(&command_req).await;
        let parsed = self.interpreter.interpret(&raw, self.context());
        let format = req.format.unwrap_or_default();

        let content = match format {
            OutputFormat::Json => serde_json::to_string(&parsed)
                .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?,
            OutputFormat::Summary => parsed.summary(),
        };

        let metadata = self.metadata("execute_command", 1, start);
        let response = if parsed.success {
            ToolResponse::success(content, format.content_type(), metadata)
        } else {
            ToolResponse::error(content, format.content_type(), metadata)
        };
        Ok(response.into_call_tool_result())
    }

    #[tool(
        name = "get_shell_info",
        description = "Report the host platform (Windows, Linux, Darwin), the shell commands run under (cmd, powershell, pwsh, bash, sh) and which shells are installed.",
        annotations(read_only_hint = true)
    )]
    async fn get_shell_info(&self) -> Result<CallToolResult, McpError> {
        let start = Instant::now();
        // PATH probing spawns `which`/`where`; keep it off the runtime threads.
        let available = tokio::task::spawn_blocking(platform::available_shells)
            .await
            .map_err(|e| McpError::internal_error(format!("shell probe failed: {e}"), None))?;

        let info = ShellInfo::new(self.platform, available);
        let content = serde_json::to_string(&info)
            .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?;

        let response =
            ToolResponse::success(content, "json", self.metadata("get_shell_info", 0, start));
        Ok(response.into_call_tool_result())
    }

    #[tool(
        name = "execute_batch",
        description = "Execute several shell commands in order. By default stops at the first failing command; the returned list then ends with that failure. Each entry has the same shape as an execute_command result."
    )]
    async fn execute_batch(
        &self,
        Parameters(req): Parameters<ExecuteBatchRequest>,
    ) -> Result<CallToolResult, McpError> {
        let start = Instant::now();
        let requests = req
            .to_command_requests(self.default_timeout_secs)
            .map_err(to_mcp_error)?;
        let stop_on_failure = req.stop_on_failure.unwrap_or(self.stop_batch_on_failure);

        let raws = self.dispatch.execute_batch(&requests, stop_on_failure).await;
        let parsed: Vec<ParsedResult> = raws
            .iter()
            .map(|raw| self.interpreter.interpret(raw, self.context()))
            .collect();

        let format = req.format.unwrap_or_default();
        let content = match format {
            OutputFormat::Json => serde_json::to_string(&parsed)
                .map_err(|e| McpError::internal_error(format!("serialization failed: {e}"), None))?,
            OutputFormat::Summary => batch_summary(&requests, &parsed),
        };

        let metadata = self.metadata("execute_batch", parsed.len(), start);
        let all_succeeded = parsed.len() == requests.len() && parsed.iter().all(|p| p.success);
        let response = if all_succeeded {
            ToolResponse::success(content, format.content_type(), metadata)
        } else {
            ToolResponse::error(content, format.content_type(), metadata)
        };
        Ok(response.into_call_tool_result())
    }
}

/// Caller mistakes are `invalid_params`; anything else is the host's fault.
fn to_mcp_error(err: SkillError) -> McpError {
    if err.is_invalid_input() {
        McpError::invalid_params(err.user_message(), None)
    } else {
        McpError::internal_error(err.user_message(), None)
    }
}

fn batch_summary(requests: &[CommandRequest], parsed: &[ParsedResult]) -> String {
    let mut sections: Vec<String> = parsed
        .iter()
        .zip(requests)
        .enumerate()
        .map(|(i, (result, req))| format!("[{}] {}\n{}", i + 1, req.command, result.summary()))
        .collect();
    let skipped = requests.len() - parsed.len();
    if skipped > 0 {
        sections.push(format!("{skipped} command(s) not run after failure"));
    }
    sections.join("\n\n---\n\n")
}

#[tool_handler]
impl ServerHandler for BashSkillServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "bash-skill".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Bash Skill: cross-platform shell command execution for agents.\n\n\
                 1. Call `get_shell_info` to learn the platform and shell (cmd/PowerShell syntax differs from bash).\n\
                 2. Call `execute_command` for a single command, or `execute_batch` for a sequence.\n\
                 3. Read `error_type` instead of parsing stderr yourself; use `parsed_data` when present \
                 (JSON output, KEY=VALUE listings and text tables are parsed for you).\n\n\
                 Commands are not sandboxed."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
