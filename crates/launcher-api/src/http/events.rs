//! Server-sent completion events.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// GET /events
pub async fn event_stream(State(state): State<AppState>) -> impl IntoResponse {
    let mut rx = state.scheduler.subscribe();

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => match Event::default().event(event.name()).json_data(&event) {
                    Ok(sse) => yield Ok::<Event, Infallible>(sse),
                    Err(e) => warn!("Failed to encode event: {}", e),
                },
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Event subscriber lagged, {} events skipped", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
