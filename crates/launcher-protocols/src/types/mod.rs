//! Core data types.

mod job;
mod log;
mod project;
mod run;

pub use job::*;
pub use log::*;
pub use project::*;
pub use run::*;
