//! Identity source capability interface.

use std::sync::Arc;

use async_trait::async_trait;

use its_model::{IdentityRecord, ItsId};

use crate::config::{SourceConfig, SourceMode};
use crate::error::SourceResult;
use crate::remote::RemoteIdentitySource;
use crate::synthetic::SyntheticIdentitySource;

/// Capability interface over the external identity registry.
///
/// Implementations must be thread-safe; all operations are async to
/// support network I/O. Callers are written once against this trait and
/// must work unmodified against either implementation.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    /// Returns the implementation tag, for logs.
    fn kind(&self) -> &'static str;

    /// Fetches the record for an ID.
    ///
    /// ## Errors
    ///
    /// Returns [`SourceError::NotFound`](crate::SourceError::NotFound)
    /// when the registry has no record, and
    /// [`SourceError::Timeout`](crate::SourceError::Timeout) when it did
    /// not answer within budget.
    async fn fetch(&self, id: &ItsId) -> SourceResult<IdentityRecord>;

    /// Searches for records matching a free-text query.
    ///
    /// Results are ranked by a source-defined relevance order which is
    /// not required to be stable across calls.
    async fn search(&self, query: &str) -> SourceResult<Vec<IdentityRecord>>;

    /// Checks a secret against the registry's credential store.
    ///
    /// Returns `false` both for an unknown ID and for a wrong secret;
    /// the distinction is never exposed.
    async fn validate_credentials(&self, id: &ItsId, secret: &str) -> SourceResult<bool>;

    /// Tests that the source is reachable.
    ///
    /// The default implementation succeeds; the remote implementation
    /// performs a health request.
    async fn probe(&self) -> SourceResult<()> {
        Ok(())
    }
}

/// Builds the configured identity source.
///
/// ## Errors
///
/// Fails fast with a configuration error when the configuration is
/// invalid; nothing is deferred to the first request.
pub fn build_source(config: &SourceConfig) -> SourceResult<Arc<dyn IdentitySource>> {
    config.validate()?;
    match config.mode {
        SourceMode::Synthetic => Ok(Arc::new(SyntheticIdentitySource::new(
            config.min_secret_len,
        ))),
        SourceMode::Remote => Ok(Arc::new(RemoteIdentitySource::new(config)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_synthetic_by_default() {
        let source = build_source(&SourceConfig::default()).unwrap();
        assert_eq!(source.kind(), "synthetic");
    }

    #[test]
    fn remote_without_urls_fails_fast() {
        let config = SourceConfig {
            mode: SourceMode::Remote,
            ..SourceConfig::default()
        };
        assert!(build_source(&config).is_err());
    }

    #[test]
    fn builds_remote_when_configured() {
        let config = SourceConfig {
            mode: SourceMode::Remote,
            fetch_base_url: Some("https://registry.example.org".to_string()),
            credential_base_url: Some("https://auth.example.org".to_string()),
            api_key: Some("deployment-key".to_string()),
            ..SourceConfig::default()
        };
        let source = build_source(&config).unwrap();
        assert_eq!(source.kind(), "remote");
    }
}
