//! Runner error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised before a process exists.
///
/// Once a child is running every outcome is reported through
/// [`RunStatus`](launcher_protocols::RunStatus) instead.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Working directory does not exist: {0}")]
    MissingWorkingDir(PathBuf),

    #[error("No terminal available: {0}")]
    NoTerminal(String),
}
