//! Persistence for the launcher scheduler.
//!
//! - [`MemoryJobStore`]: in-process tables, used by tests and dry runs
//! - [`FileJobStore`]: `schedules.json` + `schedule_logs.json` in a data directory
//! - [`FileProjectRegistry`]: read-only view of the UI's `projects.json`

mod file;
mod memory;
mod projects;
mod tables;

pub use file::{FileJobStore, LOGS_FILE, SCHEDULES_FILE};
pub use memory::MemoryJobStore;
pub use projects::{FileProjectRegistry, MemoryProjectRegistry};
pub use tables::DEFAULT_MAX_LOG_ENTRIES;

#[cfg(test)]
mod store_tests;
