//! Single-login authentication gateway.
//!
//! Orchestrates one login: validate the ID format, check credentials,
//! fetch the identity through the cache, resolve the role, synchronize
//! the profile. A failure at any step aborts the attempt; steps 4-5
//! never run when 1-3 fail, so a failed login leaves no profile behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use its_cache::ResponseCache;
use its_model::{ItsId, LocalUserProfile, Role};
use its_roster::MembershipListStore;
use its_source::IdentitySource;

use crate::error::AuthError;
use crate::resolver::resolve;
use crate::synchronizer::ProfileSynchronizer;

/// Session-ready result of a successful login. The only boundary the
/// rest of the application depends on.
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    /// The reconciled profile.
    pub profile: LocalUserProfile,
    /// The resolved role.
    pub role: Role,
    /// When the login completed.
    pub login_at: DateTime<Utc>,
}

/// Orchestrates single logins against the identity source.
pub struct AuthenticationGateway {
    source: Arc<dyn IdentitySource>,
    cache: Arc<ResponseCache>,
    overrides: Arc<MembershipListStore>,
    synchronizer: ProfileSynchronizer,
}

impl AuthenticationGateway {
    /// Creates a gateway over the given collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn IdentitySource>,
        cache: Arc<ResponseCache>,
        overrides: Arc<MembershipListStore>,
        synchronizer: ProfileSynchronizer,
    ) -> Self {
        Self {
            source,
            cache,
            overrides,
            synchronizer,
        }
    }

    /// Performs one login attempt.
    ///
    /// ## Errors
    ///
    /// - [`AuthError::Validation`] for a malformed ID, before any
    ///   source call.
    /// - [`AuthError::InvalidCredentials`] when the secret does not
    ///   match (or the ID is unknown; the two are indistinguishable).
    /// - [`AuthError::NotFound`] when the record vanished between the
    ///   credential check and the fetch.
    /// - [`AuthError::Timeout`] when the source stayed silent past its
    ///   budget and retries.
    pub async fn login(&self, raw_id: &str, secret: &str) -> Result<AuthResult, AuthError> {
        let id: ItsId = raw_id.parse()?;

        if !self.source.validate_credentials(&id, secret).await? {
            tracing::info!(id = %id, "credential check failed");
            return Err(AuthError::InvalidCredentials);
        }

        let source = Arc::clone(&self.source);
        let fetch_id = id.clone();
        let record = self
            .cache
            .get_or_fetch(&id, move || async move { source.fetch(&fetch_id).await })
            .await?;

        let role = resolve(&record, &self.overrides);
        let profile = self.synchronizer.sync(&record, role).await;

        tracing::info!(id = %id, role = %role, source = self.source.kind(), "login resolved");
        Ok(AuthResult {
            profile,
            role,
            login_at: Utc::now(),
        })
    }

    /// Performs one login attempt under a caller-provided deadline.
    ///
    /// ## Errors
    ///
    /// As [`AuthenticationGateway::login`], plus [`AuthError::Timeout`]
    /// when the whole attempt (including any in-flight fetch) exceeds
    /// `budget`.
    pub async fn login_with_deadline(
        &self,
        raw_id: &str,
        secret: &str,
        budget: Duration,
    ) -> Result<AuthResult, AuthError> {
        match tokio::time::timeout(budget, self.login(raw_id, secret)).await {
            Ok(result) => result,
            Err(_) => Err(AuthError::Timeout(format!(
                "login did not complete within {}ms",
                budget.as_millis()
            ))),
        }
    }
}
