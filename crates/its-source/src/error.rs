//! Identity source error types.

use thiserror::Error;

use its_model::ItsId;

/// Errors that can occur while talking to an identity source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Input failed validation before any I/O was attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The source has no record for the ID.
    #[error("no record for id {0}")]
    NotFound(ItsId),

    /// The source did not answer within budget after exhausting retries.
    /// Callers may retry later; a [`SourceError::NotFound`] must not be.
    #[error("source timed out: {0}")]
    Timeout(String),

    /// Fatal misconfiguration. Detected at startup, never per request.
    #[error("source configuration error: {0}")]
    Configuration(String),
}

impl SourceError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Returns true if a retry may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true for a missing-record error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for identity source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_are_retryable() {
        assert!(SourceError::timeout("503").is_retryable());
        assert!(!SourceError::validation("bad id").is_retryable());
        assert!(!SourceError::config("no url").is_retryable());
        assert!(!SourceError::NotFound(ItsId::new("12345678").unwrap()).is_retryable());
    }

    #[test]
    fn not_found_names_the_id() {
        let err = SourceError::NotFound(ItsId::new("00000001").unwrap());
        assert!(err.is_not_found());
        assert!(err.to_string().contains("00000001"));
    }
}
