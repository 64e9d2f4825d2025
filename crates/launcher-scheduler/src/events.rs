//! Completion events published to live observers.

use serde::Serialize;

use launcher_protocols::RunStatus;

/// Something observers may want to refresh on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    /// A scheduled run finished and was recorded.
    #[serde(rename_all = "camelCase")]
    JobExecuted {
        job_id: String,
        log_id: Option<String>,
        status: RunStatus,
        exit_code: Option<i32>,
    },

    /// A manual run finished and was recorded.
    #[serde(rename_all = "camelCase")]
    ManualExecuted {
        log_id: Option<String>,
        project_name: String,
        status: RunStatus,
        exit_code: Option<i32>,
    },
}

impl SchedulerEvent {
    /// SSE event name.
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerEvent::JobExecuted { .. } => "job_executed",
            SchedulerEvent::ManualExecuted { .. } => "manual_executed",
        }
    }
}
