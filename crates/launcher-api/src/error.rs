//! API error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use launcher_scheduler::SchedulerError;

use crate::http::envelope::ApiResponse;

/// Errors returned to API callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SchedulerError> for ApiError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::NotFound(_) => ApiError::NotFound(err.to_string()),
            SchedulerError::InvalidSchedule { .. }
            | SchedulerError::InvalidTimeout(_)
            | SchedulerError::PathMissing(_)
            | SchedulerError::UnregisteredProject(_) => ApiError::BadRequest(err.to_string()),
            SchedulerError::Store(_) | SchedulerError::Runner(_) | SchedulerError::Task(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("API error: {}", self);
        }
        (status, Json(ApiResponse::<()>::failure(self.to_string()))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
