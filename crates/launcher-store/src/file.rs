//! File system based job store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use launcher_protocols::{
    Job, JobSpec, JobStore, JobUpdate, LogEntry, LogPage, LogQuery, NewLogEntry, RunMetadata,
    StoreError, StoreResult,
};

use crate::tables::{self, DEFAULT_MAX_LOG_ENTRIES};

/// Jobs table file name.
pub const SCHEDULES_FILE: &str = "schedules.json";
/// Execution log file name.
pub const LOGS_FILE: &str = "schedule_logs.json";

/// Job store persisting both tables as pretty-printed JSON arrays.
///
/// Every read-modify-write cycle runs under one async mutex so concurrent
/// completions cannot lose each other's updates.
pub struct FileJobStore {
    data_dir: PathBuf,
    max_logs: usize,
    lock: Mutex<()>,
}

impl FileJobStore {
    /// Create a file store rooted at `data_dir`, creating the directory.
    pub async fn new(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).await.map_err(|e| {
            StoreError::Storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        debug!("FileJobStore initialized at {:?}", data_dir);

        Ok(Self {
            data_dir,
            max_logs: DEFAULT_MAX_LOG_ENTRIES,
            lock: Mutex::new(()),
        })
    }

    pub fn with_max_logs(mut self, max_logs: usize) -> Self {
        self.max_logs = max_logs;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn schedules_path(&self) -> PathBuf {
        self.data_dir.join(SCHEDULES_FILE)
    }

    fn logs_path(&self) -> PathBuf {
        self.data_dir.join(LOGS_FILE)
    }

    async fn load_jobs(&self) -> Vec<Job> {
        load_table(&self.schedules_path()).await
    }

    async fn load_logs(&self) -> Vec<LogEntry> {
        load_table(&self.logs_path()).await
    }

    async fn save_jobs(&self, jobs: &[Job]) -> StoreResult<()> {
        save_table(&self.schedules_path(), jobs).await
    }

    async fn save_logs(&self, logs: &[LogEntry]) -> StoreResult<()> {
        save_table(&self.logs_path(), logs).await
    }
}

/// Read a JSON array; a missing or unreadable file is an empty table.
async fn load_table<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return Vec::new();
        }
    };

    if content.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str(&content) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Failed to parse {:?}, treating as empty: {}", path, e);
            Vec::new()
        }
    }
}

/// Write through a temporary file and rename it over the target.
async fn save_table<T: Serialize>(path: &Path, rows: &[T]) -> StoreResult<()> {
    let content = serde_json::to_string_pretty(rows)?;
    let tmp = path.with_extension("json.tmp");

    fs::write(&tmp, content)
        .await
        .map_err(|e| StoreError::Storage(format!("Failed to write {:?}: {}", tmp, e)))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::Storage(format!("Failed to replace {:?}: {}", path, e)))?;

    Ok(())
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn list_jobs(&self) -> StoreResult<Vec<Job>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_jobs().await)
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        let _guard = self.lock.lock().await;
        Ok(self.load_jobs().await.into_iter().find(|j| j.id == id))
    }

    async fn find_job_for_command(
        &self,
        project_id: &str,
        command_index: usize,
    ) -> StoreResult<Option<Job>> {
        let _guard = self.lock.lock().await;
        let jobs = self.load_jobs().await;
        Ok(tables::find_for_command(&jobs, project_id, command_index))
    }

    async fn create_job(&self, spec: JobSpec) -> StoreResult<Job> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load_jobs().await;
        let job = Job::from_spec(spec);
        jobs.push(job.clone());
        self.save_jobs(&jobs).await?;
        debug!("Created schedule '{}' in {:?}", job.id, self.schedules_path());
        Ok(job)
    }

    async fn update_job(&self, id: &str, update: JobUpdate) -> StoreResult<Job> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load_jobs().await;
        let job = tables::update_job(&mut jobs, id, update)?;
        self.save_jobs(&jobs).await?;
        Ok(job)
    }

    async fn update_job_run_metadata(&self, id: &str, meta: RunMetadata) -> StoreResult<()> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load_jobs().await;
        if tables::update_run_metadata(&mut jobs, id, meta) {
            self.save_jobs(&jobs).await?;
        } else {
            debug!("Schedule '{}' was removed before its run finished", id);
        }
        Ok(())
    }

    async fn delete_job(&self, id: &str) -> StoreResult<bool> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load_jobs().await;
        let removed = tables::delete_job(&mut jobs, id);
        if removed {
            self.save_jobs(&jobs).await?;
            debug!("Deleted schedule '{}'", id);
        }
        Ok(removed)
    }

    async fn delete_jobs_for_project(&self, project_id: &str) -> StoreResult<usize> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load_jobs().await;
        let removed = tables::delete_jobs_for_project(&mut jobs, project_id);
        if removed > 0 {
            self.save_jobs(&jobs).await?;
        }
        Ok(removed)
    }

    async fn append_log(&self, entry: NewLogEntry) -> StoreResult<LogEntry> {
        let _guard = self.lock.lock().await;
        let mut logs = self.load_logs().await;
        let entry = tables::prepend_log(&mut logs, entry, self.max_logs);
        self.save_logs(&logs).await?;
        Ok(entry)
    }

    async fn list_logs(&self, query: &LogQuery) -> StoreResult<LogPage> {
        let _guard = self.lock.lock().await;
        let logs = self.load_logs().await;
        Ok(tables::page_logs(&logs, query))
    }

    async fn clear_logs(&self, schedule_id: Option<&str>) -> StoreResult<usize> {
        let _guard = self.lock.lock().await;
        let mut logs = self.load_logs().await;
        let removed = tables::clear_logs(&mut logs, schedule_id);
        self.save_logs(&logs).await?;
        Ok(removed)
    }
}
