//! Visible terminal launches.

use std::path::Path;
use std::time::Duration;

use crate::error::RunnerError;
use crate::request::RunRequest;
use crate::shell;

/// Placeholder replaced by the script in configured terminal arguments.
pub const SCRIPT_PLACEHOLDER: &str = "{script}";

/// Builds the invocation that opens a terminal window running a command.
pub trait TerminalLauncher: Send + Sync {
    fn invocation(
        &self,
        working_dir: &Path,
        command: &str,
        timeout: Duration,
    ) -> Result<RunRequest, RunnerError>;
}

/// Terminal launcher driven by configuration, with per-OS defaults.
///
/// With no program configured: Terminal.app via `osascript` on macOS, a new
/// `cmd` window on Windows, and `x-terminal-emulator` elsewhere.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredTerminal {
    program: Option<String>,
    args: Vec<String>,
}

impl ConfiguredTerminal {
    pub fn new(program: Option<String>, args: Vec<String>) -> Self {
        Self {
            program: program.filter(|p| !p.trim().is_empty()),
            args,
        }
    }

    fn configured(&self, program: &str, script: String) -> (String, Vec<String>) {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|a| a.replace(SCRIPT_PLACEHOLDER, &script))
            .collect();
        if !self.args.iter().any(|a| a.contains(SCRIPT_PLACEHOLDER)) {
            args.push(script);
        }
        (program.to_string(), args)
    }
}

#[cfg(target_os = "macos")]
fn platform_default(working_dir: &str, command: &str) -> Result<(String, Vec<String>), RunnerError> {
    let script = shell::escape_applescript(&shell::terminal_script(working_dir, command));
    Ok((
        "osascript".to_string(),
        vec![
            "-e".to_string(),
            format!("tell application \"Terminal\" to do script \"{}\"", script),
            "-e".to_string(),
            "tell application \"Terminal\" to activate".to_string(),
        ],
    ))
}

#[cfg(target_os = "windows")]
fn platform_default(working_dir: &str, command: &str) -> Result<(String, Vec<String>), RunnerError> {
    Ok((
        "cmd".to_string(),
        vec![
            "/C".to_string(),
            "start".to_string(),
            String::new(),
            "cmd".to_string(),
            "/K".to_string(),
            format!("cd /d \"{}\" && {}", working_dir, command),
        ],
    ))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_default(working_dir: &str, command: &str) -> Result<(String, Vec<String>), RunnerError> {
    Ok((
        "x-terminal-emulator".to_string(),
        vec![
            "-e".to_string(),
            "sh".to_string(),
            "-c".to_string(),
            shell::terminal_script(working_dir, command),
        ],
    ))
}

#[cfg(not(any(unix, target_os = "windows")))]
fn platform_default(_working_dir: &str, _command: &str) -> Result<(String, Vec<String>), RunnerError> {
    Err(RunnerError::NoTerminal(
        "no default terminal for this platform, set terminal.program".to_string(),
    ))
}

impl TerminalLauncher for ConfiguredTerminal {
    fn invocation(
        &self,
        working_dir: &Path,
        command: &str,
        timeout: Duration,
    ) -> Result<RunRequest, RunnerError> {
        let dir = working_dir.to_string_lossy();
        let (program, args) = match &self.program {
            Some(program) => self.configured(program, shell::terminal_script(&dir, command)),
            None => platform_default(&dir, command)?,
        };

        Ok(RunRequest::new(program, args, working_dir, timeout).with_capture(false))
    }
}
