//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication or reconciliation error.
    #[error("{0}")]
    Auth(#[from] its_auth::AuthError),

    /// Identity source error.
    #[error("{0}")]
    Source(#[from] its_source::SourceError),

    /// Roster upload error.
    #[error("{0}")]
    Roster(#[from] its_roster::RosterError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
