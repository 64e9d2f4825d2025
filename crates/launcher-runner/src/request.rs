//! Execution request.

use std::path::PathBuf;
use std::time::Duration;

use crate::shell;

/// One process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub timeout: Duration,
    /// Pipe and capture stdout/stderr. Terminal launches leave this off.
    pub capture_output: bool,
}

impl RunRequest {
    /// Run user-authored shell text through the platform shell.
    pub fn shell(command: &str, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let (program, flag) = shell::platform_shell();
        Self {
            program: program.to_string(),
            args: vec![flag.to_string(), command.to_string()],
            working_dir: working_dir.into(),
            timeout,
            capture_output: true,
        }
    }

    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
            timeout,
            capture_output: true,
        }
    }

    pub fn with_capture(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    /// Timeout from a whole number of minutes.
    pub fn minutes(minutes: u32) -> Duration {
        Duration::from_secs(u64::from(minutes) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_request() {
        let req = RunRequest::shell("echo hi", "/tmp", Duration::from_secs(1));
        assert!(req.capture_output);
        assert_eq!(req.args.last().map(String::as_str), Some("echo hi"));
        assert_eq!(req.working_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn test_minutes() {
        assert_eq!(RunRequest::minutes(2), Duration::from_secs(120));
    }

    #[test]
    fn test_with_capture() {
        let req = RunRequest::new("ls", vec![], "/", Duration::from_secs(1)).with_capture(false);
        assert!(!req.capture_output);
    }
}
