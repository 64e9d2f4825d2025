//! Health, cron validation and manual execution.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use launcher_scheduler::{CronSchedule, ManualOutcome, ManualRequest};

use crate::error::ApiResult;
use crate::http::envelope::{Envelope, json_body};
use crate::state::AppState;

/// Fire times returned by cron validation.
const PREVIEW_RUNS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub active_timers: usize,
    pub running: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CronValidateRequest {
    pub expression: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub next_runs: Vec<DateTime<Local>>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Envelope<HealthResponse> {
    Envelope::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        active_timers: state.scheduler.active_timer_count(),
        running: state.scheduler.running_job_ids(),
    })
}

/// POST /cron/validate
pub async fn validate_cron(
    payload: Result<Json<CronValidateRequest>, JsonRejection>,
) -> ApiResult<Envelope<CronValidateResponse>> {
    let request = json_body(payload)?;
    let response = match CronSchedule::parse(&request.expression) {
        Ok(schedule) => CronValidateResponse {
            valid: true,
            error: None,
            next_runs: schedule.upcoming(PREVIEW_RUNS),
        },
        Err(e) => CronValidateResponse {
            valid: false,
            error: Some(e.to_string()),
            next_runs: Vec::new(),
        },
    };
    Ok(Envelope::ok(response))
}

/// POST /execute
///
/// Waits for the command (or the terminal launcher) to exit.
pub async fn execute(
    State(state): State<AppState>,
    payload: Result<Json<ManualRequest>, JsonRejection>,
) -> ApiResult<Envelope<ManualOutcome>> {
    let request = json_body(payload)?;
    Ok(Envelope::ok(state.scheduler.execute_now(request).await?))
}
