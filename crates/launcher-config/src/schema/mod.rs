//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_scheduler;

pub use schema_scheduler::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root directory for launcher state (`~/.cc-launcher`).
pub fn launcher_home() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".cc-launcher"))
        .unwrap_or_else(|| PathBuf::from(".cc-launcher"))
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `schedules.json`, `schedule_logs.json` and `projects.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Project registry file. Defaults to `<data_dir>/projects.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects_file: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub terminal: TerminalConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            projects_file: None,
            server: ServerConfig::default(),
            scheduler: SchedulerConfig::default(),
            notifications: NotificationConfig::default(),
            terminal: TerminalConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Data directory with `~` expanded.
    pub fn resolved_data_dir(&self) -> PathBuf {
        crate::ConfigLoader::expand_path(&self.data_dir)
    }

    /// Project registry file with `~` expanded.
    pub fn resolved_projects_file(&self) -> PathBuf {
        match &self.projects_file {
            Some(path) => crate::ConfigLoader::expand_path(path),
            None => self.resolved_data_dir().join("projects.json"),
        }
    }

    /// Directory for rolling application logs.
    pub fn resolved_log_dir(&self) -> PathBuf {
        match &self.logging.dir {
            Some(dir) => crate::ConfigLoader::expand_path(dir),
            None => launcher_home().join("logs"),
        }
    }
}

fn default_data_dir() -> PathBuf {
    launcher_home().join("data")
}

/// Local HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    17321
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to daily-rotated files.
    #[serde(default = "default_true")]
    pub file: bool,

    /// Log file directory. Defaults to `~/.cc-launcher/logs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: true,
            dir: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
