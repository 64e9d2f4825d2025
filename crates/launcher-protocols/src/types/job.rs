//! Job (schedule) definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timeout applied when a job is created without one.
pub const DEFAULT_TIMEOUT_MINUTES: u32 = 60;

fn default_true() -> bool {
    true
}

fn default_timeout_minutes() -> u32 {
    DEFAULT_TIMEOUT_MINUTES
}

/// Simplified schedule shape kept alongside the cron expression so a UI can
/// round-trip its form state. Never used for scheduling directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimpleConfig {
    /// Every `minutes` minutes.
    Interval { minutes: u32 },
    /// Every day at `time` (`HH:MM`).
    Daily { time: String },
    /// Every week on `day_of_week` (0 = Sunday) at `time` (`HH:MM`).
    #[serde(rename_all = "camelCase")]
    Weekly { day_of_week: u8, time: String },
}

impl SimpleConfig {
    /// Derive the equivalent five-field cron expression.
    ///
    /// Returns `None` when the shape has no exact cron equivalent
    /// (e.g. an interval of 90 minutes) or a field is out of range.
    pub fn to_cron(&self) -> Option<String> {
        match self {
            SimpleConfig::Interval { minutes } => match *minutes {
                0 => None,
                m if m < 60 => Some(format!("*/{} * * * *", m)),
                m if m % 60 == 0 && m < 24 * 60 => Some(format!("0 */{} * * *", m / 60)),
                m if m == 24 * 60 => Some("0 0 * * *".to_string()),
                _ => None,
            },
            SimpleConfig::Daily { time } => {
                let (hour, minute) = parse_hh_mm(time)?;
                Some(format!("{} {} * * *", minute, hour))
            }
            SimpleConfig::Weekly { day_of_week, time } => {
                if *day_of_week > 6 {
                    return None;
                }
                let (hour, minute) = parse_hh_mm(time)?;
                Some(format!("{} {} * * {}", minute, hour, day_of_week))
            }
        }
    }
}

fn parse_hh_mm(time: &str) -> Option<(u32, u32)> {
    let (h, m) = time.trim().split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// A stored recurring job.
///
/// `command`, `project_path`, `project_name` and `command_name` are a snapshot
/// taken when the job was created or last updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub project_id: String,
    pub command_index: usize,
    pub command: String,
    pub project_path: String,
    pub project_name: String,
    #[serde(default)]
    pub command_name: String,
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_config: Option<SimpleConfig>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub notify_on_complete: bool,
    #[serde(default = "default_timeout_minutes")]
    pub timeout_minutes: u32,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_exit_code: Option<i32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Materialize a spec into a stored job with a fresh id and no run metadata.
    pub fn from_spec(spec: JobSpec) -> Self {
        let cron_expression = spec.effective_cron().unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            project_id: spec.project_id,
            command_index: spec.command_index,
            command: spec.command,
            project_path: spec.project_path,
            project_name: spec.project_name,
            command_name: spec.command_name,
            cron_expression,
            simple_config: spec.simple_config,
            enabled: spec.enabled,
            notify_on_complete: spec.notify_on_complete,
            timeout_minutes: spec.timeout_minutes.unwrap_or(DEFAULT_TIMEOUT_MINUTES),
            last_run_at: None,
            last_exit_code: None,
            created_at: Utc::now(),
        }
    }

    /// Label used in notifications: the command name, or the raw command.
    pub fn display_name(&self) -> &str {
        if self.command_name.is_empty() {
            &self.command
        } else {
            &self.command_name
        }
    }
}

/// Caller-supplied fields for a new job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub project_id: String,
    pub command_index: usize,
    pub command: String,
    pub project_path: String,
    pub project_name: String,
    #[serde(default)]
    pub command_name: String,
    #[serde(default)]
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_config: Option<SimpleConfig>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub notify_on_complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
}

impl JobSpec {
    pub fn new(
        project_id: impl Into<String>,
        command_index: usize,
        command: impl Into<String>,
        project_path: impl Into<String>,
        project_name: impl Into<String>,
        cron_expression: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            command_index,
            command: command.into(),
            project_path: project_path.into(),
            project_name: project_name.into(),
            command_name: String::new(),
            cron_expression: cron_expression.into(),
            simple_config: None,
            enabled: true,
            notify_on_complete: false,
            timeout_minutes: None,
        }
    }

    pub fn with_command_name(mut self, name: impl Into<String>) -> Self {
        self.command_name = name.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify_on_complete = notify;
        self
    }

    pub fn with_timeout_minutes(mut self, minutes: u32) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }

    pub fn with_simple_config(mut self, config: SimpleConfig) -> Self {
        self.simple_config = Some(config);
        self
    }

    /// The explicit cron expression, or one derived from `simple_config`
    /// when the expression is blank.
    pub fn effective_cron(&self) -> Option<String> {
        if !self.cron_expression.trim().is_empty() {
            return Some(self.cron_expression.clone());
        }
        self.simple_config.as_ref().and_then(SimpleConfig::to_cron)
    }
}

/// Partial update; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simple_config: Option<SimpleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_on_complete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_minutes: Option<u32>,
}

impl JobUpdate {
    /// Update that only flips `enabled`.
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Self::default()
        }
    }

    pub fn with_cron_expression(mut self, expr: impl Into<String>) -> Self {
        self.cron_expression = Some(expr.into());
        self
    }

    /// When only a `simple_config` is supplied, fill in the derived cron.
    pub fn normalize(mut self) -> Self {
        if self.cron_expression.is_none() {
            self.cron_expression = self.simple_config.as_ref().and_then(SimpleConfig::to_cron);
        }
        self
    }

    /// Merge the provided fields into `job`. Run metadata is never touched.
    pub fn apply(self, job: &mut Job) {
        if let Some(v) = self.project_id {
            job.project_id = v;
        }
        if let Some(v) = self.command_index {
            job.command_index = v;
        }
        if let Some(v) = self.command {
            job.command = v;
        }
        if let Some(v) = self.project_path {
            job.project_path = v;
        }
        if let Some(v) = self.project_name {
            job.project_name = v;
        }
        if let Some(v) = self.command_name {
            job.command_name = v;
        }
        if let Some(v) = self.cron_expression {
            job.cron_expression = v;
        }
        if let Some(v) = self.simple_config {
            job.simple_config = Some(v);
        }
        if let Some(v) = self.enabled {
            job.enabled = v;
        }
        if let Some(v) = self.notify_on_complete {
            job.notify_on_complete = v;
        }
        if let Some(v) = self.timeout_minutes {
            job.timeout_minutes = v;
        }
    }
}

/// Post-execution metadata written through the narrow update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub last_run_at: DateTime<Utc>,
    pub last_exit_code: Option<i32>,
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
