//! Manual (user-triggered) executions.

use serde::{Deserialize, Serialize};

use launcher_protocols::{ExecutionMode, LogEntry, RunResult};

/// A one-off execution request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRequest {
    pub project_path: String,
    pub command: String,
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub command_name: String,
    /// Overrides the configured manual timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
}

impl ManualRequest {
    pub fn new(project_path: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            command: command.into(),
            mode: ExecutionMode::default(),
            project_name: String::new(),
            command_name: String::new(),
            timeout_minutes: None,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_names(mut self, project_name: impl Into<String>, command_name: impl Into<String>) -> Self {
        self.project_name = project_name.into();
        self.command_name = command_name.into();
        self
    }

    pub fn with_timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}

/// Result of a manual execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOutcome {
    /// The stored log entry; `None` when the log could not be written.
    pub log: Option<LogEntry>,
    pub result: RunResult,
}
