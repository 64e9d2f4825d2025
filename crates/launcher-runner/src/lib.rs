//! # cc-launcher Runner
//!
//! Runs one shell command as a managed child process: bounded output
//! capture, a wall-clock timeout with SIGTERM then SIGKILL escalation, and
//! external cancellation. Every outcome, including a failed spawn, resolves
//! to a [`RunResult`](launcher_protocols::RunResult).

mod capture;
mod error;
mod process;
mod request;
pub mod shell;
mod terminal;

pub use error::RunnerError;
pub use process::{DEFAULT_KILL_GRACE, DEFAULT_OUTPUT_CAP, ProcessRunner};
pub use request::RunRequest;
pub use terminal::{ConfiguredTerminal, TerminalLauncher};
