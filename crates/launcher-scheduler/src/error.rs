//! Scheduler error types.

use thiserror::Error;

use launcher_protocols::StoreError;
use launcher_runner::RunnerError;

use crate::cron::CronError;

/// Errors returned by [`crate::JobScheduler`] operations.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Schedule not found: {0}")]
    NotFound(String),

    #[error("Invalid cron expression '{expression}': {source}")]
    InvalidSchedule {
        expression: String,
        #[source]
        source: CronError,
    },

    #[error("Invalid timeout: {0} minutes")]
    InvalidTimeout(u32),

    #[error("Project path does not exist: {0}")]
    PathMissing(String),

    #[error("Unregistered project path: {0}")]
    UnregisteredProject(String),

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Execution task failed: {0}")]
    Task(String),
}

impl SchedulerError {
    pub(crate) fn invalid_schedule(expression: &str, source: CronError) -> Self {
        Self::InvalidSchedule {
            expression: expression.to_string(),
            source,
        }
    }
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id, .. } => SchedulerError::NotFound(id),
            other => SchedulerError::Store(other),
        }
    }
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: SchedulerError = StoreError::job_not_found("abc").into();
        assert!(matches!(err, SchedulerError::NotFound(ref id) if id == "abc"));
        assert_eq!(err.to_string(), "Schedule not found: abc");
    }

    #[test]
    fn test_storage_error_passes_through() {
        let err: SchedulerError = StoreError::Storage("disk full".to_string()).into();
        assert!(matches!(err, SchedulerError::Store(_)));
    }

    #[test]
    fn test_invalid_schedule_display() {
        let err = SchedulerError::invalid_schedule("* *", CronError::FieldCount(2));
        assert_eq!(
            err.to_string(),
            "Invalid cron expression '* *': expected 5 fields, found 2"
        );
    }
}
