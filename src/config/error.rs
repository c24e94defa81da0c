//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid host address: {0}")]
    InvalidHost(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid generation base URL")]
    InvalidBaseUrl,

    #[error("Turn deadline must be positive")]
    InvalidTurnDeadline,

    #[error("Catalog path is empty")]
    EmptyCatalogPath,

    #[error("Conversation notice '{0}' is empty")]
    EmptyNotice(&'static str),

    #[error("Default max recommended must be between 1 and 50")]
    InvalidMaxRecommended,

    #[error("Session idle timeout must be positive")]
    InvalidIdleTimeout,
}
