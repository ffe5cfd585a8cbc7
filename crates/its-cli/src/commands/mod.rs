//! Command implementations.

pub mod config;
pub mod login;
pub mod reconcile;
pub mod roster;
pub mod search;

pub use config::run_config;
pub use login::run_login;
pub use reconcile::run_reconcile;
pub use roster::run_roster;
pub use search::run_search;

use std::sync::Arc;

use its_auth::{
    AuthenticationGateway, BulkReconciliationService, InMemoryProfileStore, ProfileSynchronizer,
};
use its_cache::ResponseCache;
use its_roster::MembershipListStore;
use its_source::{build_source, IdentitySource, SourceConfig};

use crate::error::CliResult;

/// Assembled resolution pipeline for one CLI invocation.
pub struct AppContext {
    /// Effective source configuration.
    pub config: SourceConfig,
    /// The configured identity source.
    pub source: Arc<dyn IdentitySource>,
    /// Shared response cache.
    pub cache: Arc<ResponseCache>,
    /// Membership override lists (loaded from the roster file).
    pub overrides: Arc<MembershipListStore>,
    /// Single-login gateway.
    pub gateway: AuthenticationGateway,
    /// Bulk reconciliation service.
    pub bulk: BulkReconciliationService,
}

impl AppContext {
    /// Builds the pipeline from environment configuration and the given
    /// override lists.
    ///
    /// ## Errors
    ///
    /// Fails fast on source misconfiguration.
    pub fn build(overrides: MembershipListStore) -> CliResult<Self> {
        let config = SourceConfig::from_env()?;
        let source = build_source(&config)?;
        let cache = Arc::new(ResponseCache::new(config.cache_ttl));
        let overrides = Arc::new(overrides);
        let synchronizer = ProfileSynchronizer::new(Arc::new(InMemoryProfileStore::new()));

        let gateway = AuthenticationGateway::new(
            Arc::clone(&source),
            Arc::clone(&cache),
            Arc::clone(&overrides),
            synchronizer.clone(),
        );
        let bulk = BulkReconciliationService::new(
            Arc::clone(&source),
            Arc::clone(&cache),
            Arc::clone(&overrides),
            synchronizer,
            config.max_in_flight,
        );

        Ok(Self {
            config,
            source,
            cache,
            overrides,
            gateway,
            bulk,
        })
    }
}
