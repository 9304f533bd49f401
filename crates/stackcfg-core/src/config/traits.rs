//! Configuration errors

use crate::error::StackcfgError;

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for StackcfgError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => StackcfgError::Io(e),
            other => StackcfgError::Configuration(other.to_string()),
        }
    }
}
