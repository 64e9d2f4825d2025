//! Execution log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run::{ExecutionMode, RunResult, RunStatus, Trigger};

/// Default number of entries returned by a log query.
pub const DEFAULT_LOG_PAGE_SIZE: usize = 50;

/// A stored execution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    /// `None` for manual runs.
    pub schedule_id: Option<String>,
    pub project_name: String,
    #[serde(default)]
    pub command_name: String,
    pub command: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: u64,
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    pub status: RunStatus,
    pub trigger: Trigger,
    pub mode: ExecutionMode,
}

/// A log entry before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub schedule_id: Option<String>,
    pub project_name: String,
    pub command_name: String,
    pub command: String,
    pub trigger: Trigger,
    pub mode: ExecutionMode,
    pub result: RunResult,
}

impl NewLogEntry {
    pub fn into_entry(self) -> LogEntry {
        let NewLogEntry {
            schedule_id,
            project_name,
            command_name,
            command,
            trigger,
            mode,
            result,
        } = self;

        // Terminal executions never carry captured output; a launch failure
        // keeps its error message.
        let (stdout, stderr) = if mode.captures_output() {
            (result.stdout, result.stderr)
        } else if result.status == RunStatus::Error {
            (String::new(), result.stderr)
        } else {
            (String::new(), String::new())
        };

        LogEntry {
            id: Uuid::new_v4().to_string(),
            schedule_id,
            project_name,
            command_name,
            command,
            start_time: result.start_time,
            end_time: result.end_time,
            duration_ms: result.duration_ms,
            exit_code: result.exit_code,
            stdout,
            stderr,
            status: result.status,
            trigger,
            mode,
        }
    }
}

/// Filter and pagination for log listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    DEFAULT_LOG_PAGE_SIZE
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            schedule_id: None,
            limit: DEFAULT_LOG_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl LogQuery {
    pub fn for_schedule(schedule_id: impl Into<String>) -> Self {
        Self {
            schedule_id: Some(schedule_id.into()),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

/// One page of logs, newest first. `total` counts all matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPage {
    pub total: usize,
    pub logs: Vec<LogEntry>,
}
