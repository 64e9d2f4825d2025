//! Shared handler state.

use std::time::Instant;

use launcher_scheduler::JobScheduler;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: JobScheduler,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(scheduler: JobScheduler) -> Self {
        Self {
            scheduler,
            started_at: Instant::now(),
        }
    }
}
