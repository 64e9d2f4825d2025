//! HTTP routes.
//!
//! ```text
//! GET    /health
//! GET    /schedules
//! POST   /schedules
//! GET    /schedules/for-command?projectId=&commandIndex=
//! GET    /schedules/{id}
//! PUT    /schedules/{id}
//! DELETE /schedules/{id}
//! POST   /schedules/{id}/toggle
//! POST   /schedules/{id}/run
//! DELETE /projects/{projectId}/schedules
//! GET    /logs?scheduleId=&limit=&offset=
//! DELETE /logs?scheduleId=
//! POST   /cron/validate
//! POST   /execute
//! GET    /events
//! ```

pub mod envelope;
mod events;
mod logs;
mod schedules;
mod system;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use envelope::ApiResponse;
pub use schedules::{RunResponse, ToggleRequest};
pub use system::{CronValidateRequest, CronValidateResponse, HealthResponse};

/// Build the router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route(
            "/schedules",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route("/schedules/for-command", get(schedules::schedule_for_command))
        .route(
            "/schedules/{id}",
            get(schedules::get_schedule)
                .put(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
        .route("/schedules/{id}/toggle", post(schedules::toggle_schedule))
        .route("/schedules/{id}/run", post(schedules::run_schedule))
        .route(
            "/projects/{project_id}/schedules",
            delete(schedules::delete_project_schedules),
        )
        .route("/logs", get(logs::list_logs).delete(logs::clear_logs))
        .route("/cron/validate", post(system::validate_cron))
        .route("/execute", post(system::execute))
        .route("/events", get(events::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
