//! In-memory job store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use launcher_protocols::{
    Job, JobSpec, JobStore, JobUpdate, LogEntry, LogPage, LogQuery, NewLogEntry, RunMetadata,
    StoreResult,
};

use crate::tables::{self, DEFAULT_MAX_LOG_ENTRIES};

/// In-memory job store for testing.
pub struct MemoryJobStore {
    jobs: RwLock<Vec<Job>>,
    logs: RwLock<Vec<LogEntry>>,
    max_logs: usize,
}

impl MemoryJobStore {
    /// Create a new memory store.
    pub fn new() -> Self {
        Self::with_max_logs(DEFAULT_MAX_LOG_ENTRIES)
    }

    pub fn with_max_logs(max_logs: usize) -> Self {
        Self {
            jobs: RwLock::new(Vec::new()),
            logs: RwLock::new(Vec::new()),
            max_logs,
        }
    }
}

impl Default for MemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn find_job_for_command(
        &self,
        project_id: &str,
        command_index: usize,
    ) -> StoreResult<Option<Job>> {
        let jobs = self.jobs.read().await;
        Ok(tables::find_for_command(&jobs, project_id, command_index))
    }

    async fn create_job(&self, spec: JobSpec) -> StoreResult<Job> {
        let job = Job::from_spec(spec);
        self.jobs.write().await.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: &str, update: JobUpdate) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        tables::update_job(&mut jobs, id, update)
    }

    async fn update_job_run_metadata(&self, id: &str, meta: RunMetadata) -> StoreResult<()> {
        let mut jobs = self.jobs.write().await;
        tables::update_run_metadata(&mut jobs, id, meta);
        Ok(())
    }

    async fn delete_job(&self, id: &str) -> StoreResult<bool> {
        let mut jobs = self.jobs.write().await;
        Ok(tables::delete_job(&mut jobs, id))
    }

    async fn delete_jobs_for_project(&self, project_id: &str) -> StoreResult<usize> {
        let mut jobs = self.jobs.write().await;
        Ok(tables::delete_jobs_for_project(&mut jobs, project_id))
    }

    async fn append_log(&self, entry: NewLogEntry) -> StoreResult<LogEntry> {
        let mut logs = self.logs.write().await;
        Ok(tables::prepend_log(&mut logs, entry, self.max_logs))
    }

    async fn list_logs(&self, query: &LogQuery) -> StoreResult<LogPage> {
        let logs = self.logs.read().await;
        Ok(tables::page_logs(&logs, query))
    }

    async fn clear_logs(&self, schedule_id: Option<&str>) -> StoreResult<usize> {
        let mut logs = self.logs.write().await;
        Ok(tables::clear_logs(&mut logs, schedule_id))
    }
}
