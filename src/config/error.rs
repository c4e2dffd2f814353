//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Telemetry initialisation failed: {0}")]
    TelemetryInit(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Listener timeout must be between 1 and 900 seconds")]
    InvalidTimeout,

    #[error("Keyword must not be empty: {0}")]
    EmptyKeyword(&'static str),

    #[error("Back option and cancel keyword must differ")]
    ConflictingKeywords,

    #[error("Ended notice must not be empty")]
    EmptyEndedNotice,

    #[error("Back-stack size must be between 1 and 1024")]
    InvalidBackStack,

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
