//! Job store protocol.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Job, JobSpec, JobUpdate, LogEntry, LogPage, LogQuery, NewLogEntry, RunMetadata};

/// Durable jobs table plus a bounded, newest-first execution log.
///
/// Read failures of the backing storage degrade to empty results; write
/// failures are returned as errors.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// All jobs in insertion order.
    async fn list_jobs(&self) -> StoreResult<Vec<Job>>;

    /// Load a job by id.
    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>>;

    /// First job bound to `(project_id, command_index)`.
    async fn find_job_for_command(
        &self,
        project_id: &str,
        command_index: usize,
    ) -> StoreResult<Option<Job>>;

    /// Persist a new job and return the stored record.
    async fn create_job(&self, spec: JobSpec) -> StoreResult<Job>;

    /// Merge `update` into an existing job. Fails with `NotFound`.
    async fn update_job(&self, id: &str, update: JobUpdate) -> StoreResult<Job>;

    /// Record the outcome of a finished run. A missing job is not an error.
    async fn update_job_run_metadata(&self, id: &str, meta: RunMetadata) -> StoreResult<()>;

    /// Delete one job; `false` when it did not exist.
    async fn delete_job(&self, id: &str) -> StoreResult<bool>;

    /// Delete every job of a project, returning how many were removed.
    async fn delete_jobs_for_project(&self, project_id: &str) -> StoreResult<usize>;

    /// Prepend a log entry, evicting the oldest beyond the cap.
    async fn append_log(&self, entry: NewLogEntry) -> StoreResult<LogEntry>;

    /// Page through logs, optionally filtered by schedule.
    async fn list_logs(&self, query: &LogQuery) -> StoreResult<LogPage>;

    /// Clear the logs of one schedule, or all logs. Returns the number removed.
    async fn clear_logs(&self, schedule_id: Option<&str>) -> StoreResult<usize>;
}
