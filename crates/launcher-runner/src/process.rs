//! Process execution with capture, timeout and cancellation.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use chrono::Utc;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use launcher_protocols::{RunResult, RunStatus};

use crate::capture::CappedBuffer;
use crate::error::RunnerError;
use crate::request::RunRequest;

/// Per-stream capture limit.
pub const DEFAULT_OUTPUT_CAP: usize = 10 * 1024;

/// Time between SIGTERM and SIGKILL on timeout.
pub const DEFAULT_KILL_GRACE: Duration = Duration::from_secs(5);

/// How long to wait for the output pipes after the child exited. Background
/// grandchildren can hold them open indefinitely.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// How the wait on the child ended.
enum Exit {
    Exited(ExitStatus),
    TimedOut(Option<ExitStatus>),
    WaitFailed(std::io::Error),
}

/// Spawns and supervises child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    output_cap: usize,
    kill_grace: Duration,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            output_cap: DEFAULT_OUTPUT_CAP,
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }

    pub fn with_output_cap(mut self, cap: usize) -> Self {
        self.output_cap = cap;
        self
    }

    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    pub fn output_cap(&self) -> usize {
        self.output_cap
    }

    pub fn kill_grace(&self) -> Duration {
        self.kill_grace
    }

    /// Run `req` to completion.
    pub async fn run(&self, req: RunRequest) -> RunResult {
        self.run_with_cancel(req, CancellationToken::new()).await
    }

    /// Run `req`, sending a graceful termination signal when `cancel` fires.
    ///
    /// Never fails: a spawn failure resolves to [`RunStatus::Error`] with exit
    /// code -1 and the error message as stderr.
    pub async fn run_with_cancel(&self, req: RunRequest, cancel: CancellationToken) -> RunResult {
        let start_time = Utc::now();
        let started = Instant::now();

        let mut child = match self.spawn(&req) {
            Ok(child) => child,
            Err(e) => {
                warn!("{}", e);
                return RunResult {
                    start_time,
                    end_time: Utc::now(),
                    duration_ms: elapsed_ms(started),
                    exit_code: Some(-1),
                    stdout: String::new(),
                    stderr: e.to_string(),
                    status: RunStatus::Error,
                };
            }
        };

        debug!(
            "Spawned '{}' (pid {:?}) in {:?}",
            req.program,
            child.id(),
            req.working_dir
        );

        let stdout = CappedBuffer::new(self.output_cap);
        let stderr = CappedBuffer::new(self.output_cap);
        let mut readers = Vec::new();
        if let Some(out) = child.stdout.take() {
            let buf = stdout.clone();
            readers.push(tokio::spawn(async move { buf.fill(out).await }));
        }
        if let Some(err) = child.stderr.take() {
            let buf = stderr.clone();
            readers.push(tokio::spawn(async move { buf.fill(err).await }));
        }

        let exit = self.supervise(&mut child, req.timeout, &cancel).await;

        for reader in readers {
            let abort = reader.abort_handle();
            if tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, reader).await.is_err() {
                debug!("Output pipe still open after exit, abandoning reader");
                abort.abort();
            }
        }

        let mut stderr = stderr.to_string_lossy();
        let (exit_code, status) = match exit {
            Exit::TimedOut(status) => {
                info!("'{}' timed out after {:?}", req.program, req.timeout);
                (status.and_then(|s| s.code()), RunStatus::Timeout)
            }
            Exit::Exited(status) => match status.code() {
                Some(0) => (Some(0), RunStatus::Success),
                Some(code) => (Some(code), RunStatus::Failed),
                // Killed by a signal. Terminal launchers often exit this way
                // once the window is detached.
                None if req.capture_output => (None, RunStatus::Failed),
                None => (None, RunStatus::Success),
            },
            Exit::WaitFailed(e) => {
                warn!("Failed to wait for '{}': {}", req.program, e);
                if stderr.is_empty() {
                    stderr = e.to_string();
                }
                (Some(-1), RunStatus::Error)
            }
        };

        RunResult {
            start_time,
            end_time: Utc::now(),
            duration_ms: elapsed_ms(started),
            exit_code,
            stdout: stdout.to_string_lossy(),
            stderr,
            status,
        }
    }

    fn spawn(&self, req: &RunRequest) -> Result<Child, RunnerError> {
        if !req.working_dir.is_dir() {
            return Err(RunnerError::MissingWorkingDir(req.working_dir.clone()));
        }

        let mut cmd = Command::new(&req.program);
        cmd.args(&req.args)
            .current_dir(&req.working_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if req.capture_output {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        #[cfg(unix)]
        cmd.process_group(0);

        cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: req.program.clone(),
            source,
        })
    }

    async fn supervise(
        &self,
        child: &mut Child,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Exit {
        let deadline = Instant::now() + timeout;
        let mut cancelled = false;

        loop {
            tokio::select! {
                status = child.wait() => {
                    return match status {
                        Ok(status) => Exit::Exited(status),
                        Err(e) => Exit::WaitFailed(e),
                    };
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return Exit::TimedOut(self.terminate(child).await);
                }
                _ = cancel.cancelled(), if !cancelled => {
                    cancelled = true;
                    debug!("Run cancelled, requesting termination");
                    signal_graceful(child);
                }
            }
        }
    }

    /// SIGTERM, then SIGKILL once the grace window elapses.
    async fn terminate(&self, child: &mut Child) -> Option<ExitStatus> {
        signal_graceful(child);

        match tokio::time::timeout(self.kill_grace, child.wait()).await {
            Ok(Ok(status)) => return Some(status),
            Ok(Err(e)) => {
                warn!("Failed to wait for terminated process: {}", e);
                return None;
            }
            Err(_) => {}
        }

        warn!(
            "Process ignored termination for {:?}, killing",
            self.kill_grace
        );
        force_kill(child);
        child.wait().await.ok()
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(unix)]
fn signal_group(child: &Child, signal: nix::sys::signal::Signal) -> bool {
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    let Some(pid) = child.id() else {
        return false;
    };
    match killpg(Pid::from_raw(pid as i32), signal) {
        Ok(()) => true,
        Err(e) => {
            debug!("killpg({}, {:?}) failed: {}", pid, signal, e);
            false
        }
    }
}

#[cfg(unix)]
fn signal_graceful(child: &mut Child) {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    if !signal_group(child, Signal::SIGTERM) {
        if let Some(pid) = child.id() {
            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }
    }
}

#[cfg(not(unix))]
fn signal_graceful(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(unix)]
fn force_kill(child: &mut Child) {
    signal_group(child, nix::sys::signal::Signal::SIGKILL);
    let _ = child.start_kill();
}

#[cfg(not(unix))]
fn force_kill(child: &mut Child) {
    let _ = child.start_kill();
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
