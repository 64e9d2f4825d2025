//! # cc-launcher Protocols
//!
//! Data model and interface definitions shared by the launcher crates.
//! Contains no I/O implementations.
//!
//! ## Core Traits
//!
//! - [`JobStore`] - Durable jobs table and bounded execution log
//! - [`ProjectRegistry`] - Read-only lookup of user projects
//! - [`Notifier`] - Fire-and-forget user notifications

pub mod error;
pub mod notify;
pub mod project;
pub mod store;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use notify::Notifier;
pub use project::ProjectRegistry;
pub use store::JobStore;
pub use types::*;
