//! Errors raised while loading or checking the launcher config.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// No file at the given path. `load_or_default` treats this as "use
    /// defaults".
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `${VAR}` reference to an unset variable.
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// First error reported by `ConfigValidator`.
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Dotted config key the error is about, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }
}
