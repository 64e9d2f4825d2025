//! Scheduler, notification and terminal configuration types.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Scheduler and process runner limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Timeout applied to jobs created without an explicit `timeoutMinutes`.
    #[serde(default = "default_timeout_minutes")]
    pub default_timeout_minutes: u32,

    /// Timeout for manual (non-scheduled) executions.
    #[serde(default = "default_timeout_minutes")]
    pub manual_timeout_minutes: u32,

    /// Per-stream capture limit in bytes.
    #[serde(default = "default_output_cap_bytes")]
    pub output_cap_bytes: usize,

    /// Execution log ring buffer size.
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,

    /// Seconds between the graceful termination request and the forced kill.
    #[serde(default = "default_kill_grace_seconds")]
    pub kill_grace_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_timeout_minutes: default_timeout_minutes(),
            manual_timeout_minutes: default_timeout_minutes(),
            output_cap_bytes: default_output_cap_bytes(),
            max_log_entries: default_max_log_entries(),
            kill_grace_seconds: default_kill_grace_seconds(),
        }
    }
}

fn default_timeout_minutes() -> u32 {
    60
}

fn default_output_cap_bytes() -> usize {
    10 * 1024
}

fn default_max_log_entries() -> usize {
    500
}

fn default_kill_grace_seconds() -> u64 {
    5
}

/// Which notification surface to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationBackend {
    /// Native desktop notifications (osascript / notify-send / PowerShell).
    #[default]
    Desktop,
    /// Write notifications to the tracing log.
    Log,
    /// Drop notifications.
    None,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub backend: NotificationBackend,

    /// Title prefix shown when a notification has no title.
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: NotificationBackend::default(),
            app_name: default_app_name(),
        }
    }
}

fn default_app_name() -> String {
    "CC Launcher".to_string()
}

/// Terminal used for `terminal` mode executions.
///
/// `args` may contain a `{script}` placeholder which is replaced by the
/// shell script (`cd '<dir>' && <command>; exec <shell>`). When `program` is
/// unset a per-OS default is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}
