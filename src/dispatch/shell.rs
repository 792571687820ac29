use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::config::DEFAULT_MAX_OUTPUT_BYTES;
use crate::dispatch::CommandRequest;
use crate::error::SkillError;
use crate::platform::Shell;
use crate::result::RawExecutionResult;

/// Runs commands through one shell and hands back completed raw results.
#[derive(Debug, Clone)]
pub struct ShellDispatch {
    shell: Shell,
    max_output_bytes: usize,
}

impl ShellDispatch {
    pub fn new(shell: Shell) -> Self {
        Self {
            shell,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }

    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes.max(1);
        self
    }

    /// Run one command to completion.
    ///
    /// Never fails: launch errors come back as a result with exit code -1 and
    /// the reason on stderr, timeouts as a `timed_out` result.
    ///
    /// - kill_on_drop(true) prevents zombie processes
    /// - own process group on Unix so timeouts kill grandchildren too
    /// - output capped at `max_output_bytes` per stream
    /// - stdin closed (no terminal leakage, no interactive prompts hanging)
    pub async fn execute(&self, req: &CommandRequest) -> RawExecutionResult {
        match self.run(req).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(shell = %self.shell, "command launch failed: {e}");
                RawExecutionResult::launch_failed(&e)
            }
        }
    }

    async fn run(&self, req: &CommandRequest) -> Result<RawExecutionResult, SkillError> {
        let start = Instant::now();

        if let Some(ref wd) = req.working_dir
            && !std::path::Path::new(wd).is_dir()
        {
            return Err(SkillError::InvalidRequest(format!(
                "working directory does not exist: {wd}"
            )));
        }

        let [program, flag] = self.shell.command_prefix();
        let mut cmd = Command::new(program);
        cmd.arg(flag)
            .arg(&req.command)
            .envs(&req.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(ref wd) = req.working_dir {
            cmd.current_dir(wd);
        }

        let mut child = cmd.spawn().map_err(|source| SkillError::Spawn {
            shell: self.shell.to_string(),
            source,
        })?;

        // process_group(0) makes the child its own group leader (pgid == pid).
        let child_pid = child.id();
        tracing::debug!(shell = %self.shell, pid = ?child_pid, "spawned command");

        let stdout_pipe = child
            .stdout
            .take()
            .ok_or_else(|| SkillError::Other("stdout was not piped".to_string()))?;
        let stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| SkillError::Other("stderr was not piped".to_string()))?;

        let max = self.max_output_bytes;
        let read_future = async {
            // Readers run as separate tasks so neither pipe can fill up and
            // stall the child while we drain the other one.
            let mut stdout_handle = tokio::spawn(read_capped(stdout_pipe, max));
            let mut stderr_handle = tokio::spawn(read_capped(stderr_pipe, max));

            // If either stream hits the cap the child may block writing to a
            // full pipe; kill the group so the other reader sees EOF.
            let (stdout_buf, stderr_buf) = tokio::select! {
                result = &mut stdout_handle => {
                    let buf = result.unwrap_or_default();
                    if buf.len() >= max {
                        tracing::warn!(max, "stdout cap reached, killing command");
                        kill_process_group(child_pid);
                    }
                    (buf, stderr_handle.await.unwrap_or_default())
                }
                result = &mut stderr_handle => {
                    let buf = result.unwrap_or_default();
                    if buf.len() >= max {
                        tracing::warn!(max, "stderr cap reached, killing command");
                        kill_process_group(child_pid);
                    }
                    (stdout_handle.await.unwrap_or_default(), buf)
                }
            };
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((stdout_buf, stderr_buf, status))
        };

        match tokio::time::timeout(req.timeout, read_future).await {
            Ok(result) => {
                let (stdout, stderr, status) = result?;
                let exit_code = exit_code(status);
                tracing::info!(
                    shell = %self.shell,
                    exit_code,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "command finished"
                );
                Ok(RawExecutionResult::from_bytes(
                    exit_code, &stdout, &stderr, false,
                ))
            }
            Err(_) => {
                // Off Unix, kill_on_drop reaps the direct child when `child` drops.
                kill_process_group(child_pid);
                tracing::warn!(
                    shell = %self.shell,
                    timeout_secs = req.timeout.as_secs(),
                    "command timed out, killed"
                );
                Ok(RawExecutionResult::timed_out(req.timeout.as_secs()))
            }
        }
    }
}

async fn read_capped<R>(pipe: R, max: usize) -> Vec<u8>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(max.min(64 * 1024));
    let mut capped = pipe.take(max as u64);
    if let Err(e) = capped.read_to_end(&mut buf).await {
        tracing::warn!("pipe read error: {e}");
    }
    buf
}

/// Exit code as a shell would report it: signal deaths become `128 + signal` on Unix.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // SAFETY: signalling a process group we created; a stale pgid only yields ESRCH.
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
