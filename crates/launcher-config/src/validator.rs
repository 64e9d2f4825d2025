//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, NotificationBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_scheduler(config, &mut result);
        Self::validate_notifications(config, &mut result);
        Self::validate_terminal(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_scheduler(config: &Config, result: &mut ValidationResult) {
        let scheduler = &config.scheduler;

        if scheduler.default_timeout_minutes == 0 {
            result.add_error(ValidationError::new(
                "scheduler.default_timeout_minutes",
                "default_timeout_minutes must be greater than 0",
            ));
        }

        if scheduler.manual_timeout_minutes == 0 {
            result.add_error(ValidationError::new(
                "scheduler.manual_timeout_minutes",
                "manual_timeout_minutes must be greater than 0",
            ));
        }

        if scheduler.output_cap_bytes == 0 {
            result.add_error(ValidationError::new(
                "scheduler.output_cap_bytes",
                "output_cap_bytes must be greater than 0",
            ));
        }

        if scheduler.output_cap_bytes > 1024 * 1024 {
            result.add_warning(ValidationWarning::new(
                "scheduler.output_cap_bytes",
                "output_cap_bytes is above 1 MiB, every log entry may hold this much per stream",
            ));
        }

        if scheduler.max_log_entries == 0 {
            result.add_error(ValidationError::new(
                "scheduler.max_log_entries",
                "max_log_entries must be greater than 0",
            ));
        }

        if scheduler.kill_grace_seconds == 0 {
            result.add_warning(ValidationWarning::new(
                "scheduler.kill_grace_seconds",
                "kill_grace_seconds is 0, timed out processes are killed immediately",
            ));
        }
    }

    fn validate_notifications(config: &Config, result: &mut ValidationResult) {
        if config.notifications.enabled && config.notifications.backend == NotificationBackend::None
        {
            result.add_warning(ValidationWarning::new(
                "notifications.backend",
                "notifications are enabled but the backend is 'none'",
            ));
        }
    }

    fn validate_terminal(config: &Config, result: &mut ValidationResult) {
        let terminal = &config.terminal;

        if let Some(program) = &terminal.program {
            if program.trim().is_empty() {
                result.add_error(ValidationError::new(
                    "terminal.program",
                    "terminal program cannot be empty",
                ));
            }
            if !terminal.args.iter().any(|a| a.contains("{script}")) {
                result.add_warning(ValidationWarning::new(
                    "terminal.args",
                    "no argument contains {script}, the script will be appended as the last argument",
                ));
            }
        } else if !terminal.args.is_empty() {
            result.add_warning(ValidationWarning::new(
                "terminal.args",
                "terminal.args is ignored without terminal.program",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
