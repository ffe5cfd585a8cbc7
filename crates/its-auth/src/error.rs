//! Authentication and reconciliation error types.

use thiserror::Error;

use its_model::{InvalidItsId, ItsId};
use its_source::SourceError;

/// Errors surfaced by login and reconciliation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input, rejected before any source call.
    #[error("validation error: {0}")]
    Validation(String),

    /// The secret did not match. The message is deliberately generic:
    /// an unknown ID and a wrong secret are indistinguishable to the
    /// caller.
    #[error("authentication failed")]
    InvalidCredentials,

    /// The source has no record for the ID.
    #[error("no record for id {0}")]
    NotFound(ItsId),

    /// The source did not answer within budget. Worth retrying later,
    /// unlike [`AuthError::NotFound`].
    #[error("identity source timed out: {0}")]
    Timeout(String),

    /// Fatal source misconfiguration.
    #[error("source configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Returns true for failures the caller should present as a client
    /// input problem rather than a system fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidCredentials)
    }

    /// Returns true if a retry may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<SourceError> for AuthError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Validation(msg) => Self::Validation(msg),
            SourceError::NotFound(id) => Self::NotFound(id),
            SourceError::Timeout(msg) => Self::Timeout(msg),
            SourceError::Configuration(msg) => Self::Configuration(msg),
        }
    }
}

impl From<InvalidItsId> for AuthError {
    fn from(err: InvalidItsId) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_failure_message_is_generic() {
        // Never reveals whether the id exists.
        assert_eq!(AuthError::InvalidCredentials.to_string(), "authentication failed");
    }

    #[test]
    fn classification() {
        assert!(AuthError::Validation("short id".to_string()).is_client_error());
        assert!(AuthError::InvalidCredentials.is_client_error());
        assert!(!AuthError::Timeout("slow".to_string()).is_client_error());

        assert!(AuthError::Timeout("slow".to_string()).is_retryable());
        assert!(!AuthError::NotFound(ItsId::new("12345678").unwrap()).is_retryable());
    }

    #[test]
    fn source_errors_map_variant_for_variant() {
        let err: AuthError = SourceError::timeout("503").into();
        assert!(matches!(err, AuthError::Timeout(_)));

        let err: AuthError = SourceError::config("no url").into();
        assert!(matches!(err, AuthError::Configuration(_)));
    }
}
