//! Error types for the persistence layer.

use thiserror::Error;

/// Errors raised by [`crate::JobStore`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A durable write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization of a table failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Shorthand for a missing job.
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "Schedule",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
