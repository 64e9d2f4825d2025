//! Execution outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a single execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Exited with code 0 (or without a code in terminal mode).
    Success,
    /// Exited with a nonzero code, or was terminated by a signal.
    Failed,
    /// Exceeded its wall-clock budget and was terminated.
    Timeout,
    /// Could not be started.
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Timeout => "timeout",
            RunStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// What started an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduled,
    Manual,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Scheduled => "scheduled",
            Trigger::Manual => "manual",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a command is run.
///
/// `Terminal` opens a visible terminal window and captures nothing;
/// `Silent` runs in the background with output capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Terminal,
    Silent,
}

impl ExecutionMode {
    pub fn captures_output(&self) -> bool {
        matches!(self, ExecutionMode::Silent)
    }
}

/// Structured result of one process execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub status: RunStatus,
}

impl RunResult {
    /// Duration rounded to whole seconds.
    pub fn duration_secs_rounded(&self) -> u64 {
        (self.duration_ms + 500) / 1000
    }
}
