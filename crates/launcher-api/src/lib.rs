//! # cc-launcher API
//!
//! Local HTTP interface to the scheduler. Every JSON response uses the
//! envelope `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`; `GET /events` streams completion
//! events as server-sent events.

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::create_router;
pub use server::{ApiServer, DEFAULT_PORT, ServerConfig};
pub use state::AppState;
