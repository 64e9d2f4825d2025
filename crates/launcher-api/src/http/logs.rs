//! Execution log handlers.

use axum::extract::{Query, State};
use serde::Deserialize;

use launcher_protocols::{LogPage, LogQuery};

use crate::error::ApiResult;
use crate::http::envelope::Envelope;
use crate::http::schedules::RemovedResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearQuery {
    pub schedule_id: Option<String>,
}

/// GET /logs
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> ApiResult<Envelope<LogPage>> {
    Ok(Envelope::ok(state.scheduler.list_logs(&query).await?))
}

/// DELETE /logs
pub async fn clear_logs(
    State(state): State<AppState>,
    Query(query): Query<ClearQuery>,
) -> ApiResult<Envelope<RemovedResponse>> {
    let removed = state
        .scheduler
        .clear_logs(query.schedule_id.as_deref())
        .await?;
    Ok(Envelope::ok(RemovedResponse { removed }))
}
