//! Schedule handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use launcher_protocols::{Job, JobSpec, JobUpdate};
use launcher_scheduler::FireOutcome;

use crate::error::ApiResult;
use crate::http::envelope::{Envelope, json_body};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandQuery {
    pub project_id: String,
    pub command_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub outcome: &'static str,
}

impl From<FireOutcome> for RunResponse {
    fn from(outcome: FireOutcome) -> Self {
        let outcome = match outcome {
            FireOutcome::Started => "started",
            FireOutcome::AlreadyRunning => "already_running",
            FireOutcome::Inactive => "inactive",
        };
        Self { outcome }
    }
}

#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

/// GET /schedules
pub async fn list_schedules(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Job>>> {
    Ok(Envelope::ok(state.scheduler.list_jobs().await?))
}

/// GET /schedules/for-command
pub async fn schedule_for_command(
    State(state): State<AppState>,
    Query(query): Query<CommandQuery>,
) -> ApiResult<Envelope<Option<Job>>> {
    let job = state
        .scheduler
        .get_job_for_command(&query.project_id, query.command_index)
        .await?;
    Ok(Envelope::ok(job))
}

/// GET /schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Job>> {
    Ok(Envelope::ok(state.scheduler.get_job(&id).await?))
}

/// POST /schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    payload: Result<Json<JobSpec>, JsonRejection>,
) -> ApiResult<Envelope<Job>> {
    let spec = json_body(payload)?;
    info!(
        "Creating schedule for project {} command {}",
        spec.project_id, spec.command_index
    );
    Ok(Envelope::created(state.scheduler.add_job(spec).await?))
}

/// PUT /schedules/{id}
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<JobUpdate>, JsonRejection>,
) -> ApiResult<Envelope<Job>> {
    let update = json_body(payload)?;
    Ok(Envelope::ok(state.scheduler.update_job(&id, update).await?))
}

/// DELETE /schedules/{id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<bool>> {
    Ok(Envelope::ok(state.scheduler.remove_job(&id).await?))
}

/// POST /schedules/{id}/toggle
pub async fn toggle_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<Envelope<Job>> {
    let request = json_body(payload)?;
    Ok(Envelope::ok(
        state.scheduler.toggle_job(&id, request.enabled).await?,
    ))
}

/// POST /schedules/{id}/run
pub async fn run_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<RunResponse>> {
    let outcome = state.scheduler.run_now(&id).await?;
    Ok(Envelope::ok(outcome.into()))
}

/// DELETE /projects/{project_id}/schedules
pub async fn delete_project_schedules(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Envelope<RemovedResponse>> {
    let removed = state.scheduler.remove_jobs_for_project(&project_id).await?;
    Ok(Envelope::ok(RemovedResponse { removed }))
}
