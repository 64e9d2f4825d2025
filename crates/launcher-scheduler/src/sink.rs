//! Completion sink: logs, run metadata, notifications and events.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error};

use launcher_protocols::{
    ExecutionMode, Job, JobStore, LogEntry, NewLogEntry, Notifier, RunMetadata, RunResult,
    RunStatus, Trigger,
};

use crate::events::SchedulerEvent;
use crate::manual::ManualRequest;

/// Notification title for a finished scheduled run.
pub fn notification_title(project_name: &str) -> String {
    format!("Schedule: {}", project_name)
}

/// Notification body, e.g. `Build - completed (3s)`.
pub fn notification_body(label: &str, result: &RunResult) -> String {
    let outcome = match result.status {
        RunStatus::Success => "completed",
        other => other.as_str(),
    };
    format!("{} - {} ({}s)", label, outcome, result.duration_secs_rounded())
}

/// Records every finished execution.
///
/// Failures here are logged and swallowed; a run that already happened must
/// never turn into a caller-facing error.
#[derive(Clone)]
pub struct CompletionSink {
    store: Arc<dyn JobStore>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<SchedulerEvent>,
}

impl CompletionSink {
    pub fn new(
        store: Arc<dyn JobStore>,
        notifier: Arc<dyn Notifier>,
        events: broadcast::Sender<SchedulerEvent>,
    ) -> Self {
        Self {
            store,
            notifier,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.events.subscribe()
    }

    /// Log, update run metadata, notify, then publish `job_executed`.
    pub async fn record_scheduled(&self, job: &Job, result: RunResult) -> Option<LogEntry> {
        let metadata = RunMetadata {
            last_run_at: result.end_time,
            last_exit_code: result.exit_code,
        };
        let status = result.status;
        let exit_code = result.exit_code;
        let body = notification_body(job.display_name(), &result);

        let entry = self
            .append(NewLogEntry {
                schedule_id: Some(job.id.clone()),
                project_name: job.project_name.clone(),
                command_name: job.command_name.clone(),
                command: job.command.clone(),
                trigger: Trigger::Scheduled,
                mode: ExecutionMode::Silent,
                result,
            })
            .await;

        if let Err(e) = self.store.update_job_run_metadata(&job.id, metadata).await {
            error!("Failed to update run metadata for '{}': {}", job.id, e);
        }

        if job.notify_on_complete {
            self.notifier
                .notify(&notification_title(&job.project_name), &body);
        }

        self.publish(SchedulerEvent::JobExecuted {
            job_id: job.id.clone(),
            log_id: entry.as_ref().map(|e| e.id.clone()),
            status,
            exit_code,
        });

        entry
    }

    /// Log a manual run and publish `manual_executed`. No run metadata.
    pub async fn record_manual(&self, request: &ManualRequest, result: RunResult) -> Option<LogEntry> {
        let status = result.status;
        let exit_code = result.exit_code;

        let entry = self
            .append(NewLogEntry {
                schedule_id: None,
                project_name: request.project_name.clone(),
                command_name: request.command_name.clone(),
                command: request.command.clone(),
                trigger: Trigger::Manual,
                mode: request.mode,
                result,
            })
            .await;

        self.publish(SchedulerEvent::ManualExecuted {
            log_id: entry.as_ref().map(|e| e.id.clone()),
            project_name: request.project_name.clone(),
            status,
            exit_code,
        });

        entry
    }

    async fn append(&self, entry: NewLogEntry) -> Option<LogEntry> {
        match self.store.append_log(entry).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                error!("Failed to append execution log: {}", e);
                None
            }
        }
    }

    fn publish(&self, event: SchedulerEvent) {
        if self.events.send(event).is_err() {
            debug!("No event subscribers");
        }
    }
}
