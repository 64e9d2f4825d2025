//! Table operations shared by every store backend.

use launcher_protocols::{
    Job, JobUpdate, LogEntry, LogPage, LogQuery, NewLogEntry, RunMetadata, StoreError,
    StoreResult,
};

/// Execution log ring buffer size.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 500;

pub(crate) fn find_for_command(jobs: &[Job], project_id: &str, command_index: usize) -> Option<Job> {
    jobs.iter()
        .find(|j| j.project_id == project_id && j.command_index == command_index)
        .cloned()
}

pub(crate) fn update_job(jobs: &mut [Job], id: &str, update: JobUpdate) -> StoreResult<Job> {
    let job = jobs
        .iter_mut()
        .find(|j| j.id == id)
        .ok_or_else(|| StoreError::job_not_found(id))?;
    update.apply(job);
    Ok(job.clone())
}

/// Returns `false` when the job no longer exists.
pub(crate) fn update_run_metadata(jobs: &mut [Job], id: &str, meta: RunMetadata) -> bool {
    match jobs.iter_mut().find(|j| j.id == id) {
        Some(job) => {
            job.last_run_at = Some(meta.last_run_at);
            job.last_exit_code = meta.last_exit_code;
            true
        }
        None => false,
    }
}

pub(crate) fn delete_job(jobs: &mut Vec<Job>, id: &str) -> bool {
    let before = jobs.len();
    jobs.retain(|j| j.id != id);
    jobs.len() != before
}

pub(crate) fn delete_jobs_for_project(jobs: &mut Vec<Job>, project_id: &str) -> usize {
    let before = jobs.len();
    jobs.retain(|j| j.project_id != project_id);
    before - jobs.len()
}

/// Prepend `entry` and drop the oldest entries beyond `cap`.
pub(crate) fn prepend_log(logs: &mut Vec<LogEntry>, entry: NewLogEntry, cap: usize) -> LogEntry {
    let entry = entry.into_entry();
    logs.insert(0, entry.clone());
    logs.truncate(cap.max(1));
    entry
}

pub(crate) fn page_logs(logs: &[LogEntry], query: &LogQuery) -> LogPage {
    let matches = |e: &&LogEntry| match &query.schedule_id {
        Some(id) => e.schedule_id.as_deref() == Some(id.as_str()),
        None => true,
    };
    let total = logs.iter().filter(matches).count();
    let logs = logs
        .iter()
        .filter(matches)
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect();
    LogPage { total, logs }
}

pub(crate) fn clear_logs(logs: &mut Vec<LogEntry>, schedule_id: Option<&str>) -> usize {
    let before = logs.len();
    match schedule_id {
        Some(id) => logs.retain(|e| e.schedule_id.as_deref() != Some(id)),
        None => logs.clear(),
    }
    before - logs.len()
}
