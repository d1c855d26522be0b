//! The sandbox executor (§4.7): spawns a real child process running the
//! [`trampoline`] script, enforces the wall-clock and memory limits, and
//! translates whatever happened into an [`ExecutionResult`] — sandbox
//! failures are always returned, never raised across the process boundary
//! (§7 propagation policy).

use crate::error::SandboxError;
use crate::options::{SandboxOptions, TokenWire};
use crate::result::{ExecutionResult, Status};
use crate::trampoline::TRAMPOLINE_SCRIPT;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::Instant;

const MEMORY_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub struct SandboxExecutor {
    interpreter_path: String,
}

impl Default for SandboxExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxExecutor {
    pub fn new() -> Self {
        Self { interpreter_path: "python3".to_string() }
    }

    pub fn with_interpreter(interpreter_path: impl Into<String>) -> Self {
        Self { interpreter_path: interpreter_path.into() }
    }

    #[tracing::instrument(level = "info", skip_all, fields(cpu_timeout = options.cpu_timeout_secs, memory_limit = options.memory_limit_bytes))]
    pub async fn run(&self, generated_code: &str, tokens: Vec<TokenWire>, options: &SandboxOptions) -> Result<ExecutionResult, SandboxError> {
        let request = serde_json::json!({ "code": generated_code, "tokens": tokens });
        let payload = serde_json::to_vec(&request).map_err(|e| SandboxError::Protocol { message: e.to_string() })?;

        let mut child = Command::new(&self.interpreter_path)
            .arg("-c")
            .arg(TRAMPOLINE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SandboxError::Spawn { message: e.to_string() })?;

        let pid = child.id();

        {
            let mut stdin = child.stdin.take().ok_or_else(|| SandboxError::Spawn { message: "child stdin unavailable".to_string() })?;
            stdin.write_all(&payload).await.map_err(|e| SandboxError::Protocol { message: e.to_string() })?;
        }

        let oom_flag = Arc::new(AtomicBool::new(false));
        let peak_rss = Arc::new(AtomicU64::new(0));
        let poller = pid.map(|pid| spawn_memory_poller(pid, options.memory_limit_bytes, oom_flag.clone(), peak_rss.clone()));

        let start = Instant::now();
        let timeout = Duration::from_secs(options.cpu_timeout_secs);
        let wait_result = tokio::time::timeout(timeout, read_to_completion(&mut child)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if let Some(handle) = poller {
            handle.abort();
        }

        if oom_flag.load(Ordering::SeqCst) {
            let _ = child.start_kill();
            let (stdout, stderr) = drain_partial_output(&mut child).await;
            tracing::info!(pid = ?pid, "sandbox child killed: memory limit exceeded");
            return Ok(ExecutionResult {
                status: Status::MemoryExceeded,
                stdout,
                stderr,
                return_value: None,
                duration_ms,
                peak_memory_bytes: peak_rss.load(Ordering::SeqCst),
                issues: Vec::new(),
            });
        }

        let (stdout, stderr) = match wait_result {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(SandboxError::ProcessFailed { message: e.to_string() });
            }
            Err(_) => {
                let _ = child.start_kill();
                let (stdout, stderr) = drain_partial_output(&mut child).await;
                tracing::info!(pid = ?pid, "sandbox child killed: wall-clock timeout");
                return Ok(ExecutionResult {
                    status: Status::Timeout,
                    stdout,
                    stderr,
                    return_value: None,
                    duration_ms,
                    peak_memory_bytes: peak_rss.load(Ordering::SeqCst),
                    issues: Vec::new(),
                });
            }
        };

        match serde_json::from_str::<ExecutionResult>(&stdout) {
            Ok(mut result) => {
                result.peak_memory_bytes = result.peak_memory_bytes.max(peak_rss.load(Ordering::SeqCst));
                Ok(result)
            }
            Err(_) => Ok(ExecutionResult {
                status: Status::Error,
                stdout,
                stderr,
                return_value: None,
                duration_ms,
                peak_memory_bytes: peak_rss.load(Ordering::SeqCst),
                issues: Vec::new(),
            }),
        }
    }
}

async fn read_to_completion(child: &mut tokio::process::Child) -> std::io::Result<(String, String)> {
    let mut stdout = String::new();
    let mut stderr = String::new();
    if let Some(mut out) = child.stdout.take() {
        out.read_to_string(&mut stdout).await?;
    }
    if let Some(mut err) = child.stderr.take() {
        err.read_to_string(&mut stderr).await?;
    }
    child.wait().await?;
    Ok((stdout, stderr))
}

async fn drain_partial_output(child: &mut tokio::process::Child) -> (String, String) {
    let mut stdout = String::new();
    let mut stderr = String::new();
    if let Some(mut out) = child.stdout.take() {
        let _ = out.read_to_string(&mut stdout).await;
    }
    if let Some(mut err) = child.stderr.take() {
        let _ = err.read_to_string(&mut stderr).await;
    }
    (stdout, stderr)
}

/// Polls `/proc/<pid>/status` for `VmRSS` on a fixed interval, rather than
/// pulling in an `rlimit`-style crate absent from the rest of the stack
/// (§4.7 ADDED). Sets `oom_flag` the first time observed RSS exceeds
/// `memory_limit_bytes`; the caller is responsible for killing the child.
fn spawn_memory_poller(pid: u32, memory_limit_bytes: u64, oom_flag: Arc<AtomicBool>, peak_rss: Arc<AtomicU64>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(MEMORY_POLL_INTERVAL).await;
            match read_vm_rss_bytes(pid) {
                Some(rss) => {
                    peak_rss.fetch_max(rss, Ordering::SeqCst);
                    if rss > memory_limit_bytes {
                        oom_flag.store(true, Ordering::SeqCst);
                        break;
                    }
                }
                None => break, // process has exited; nothing left to poll
            }
        }
    })
}

fn read_vm_rss_bytes(pid: u32) -> Option<u64> {
    let status = std::fs::read_to_string(format!("/proc/{}/status", pid)).ok()?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let kb: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_rss_line_parses_to_bytes() {
        let status = "Name:\tpython3\nVmRSS:\t    2048 kB\nThreads:\t1\n";
        let line = status.lines().find_map(|l| l.strip_prefix("VmRSS:")).unwrap();
        let kb: u64 = line.trim().trim_end_matches("kB").trim().parse().unwrap();
        assert_eq!(kb * 1024, 2097152);
    }

    #[tokio::test]
    async fn run_against_a_missing_interpreter_reports_spawn_error() {
        let executor = SandboxExecutor::with_interpreter("glyph-nonexistent-interpreter-binary");
        let result = executor.run("x = 1", Vec::new(), &SandboxOptions::default()).await;
        assert!(matches!(result, Err(SandboxError::Spawn { .. })));
    }
}
