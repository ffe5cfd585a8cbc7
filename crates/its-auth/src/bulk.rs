//! Bulk reconciliation with per-ID failure isolation.
//!
//! Resolves many IDs concurrently under a bounded in-flight limit. Each
//! ID runs the same pipeline as a single login (cache, fetch, resolve,
//! synchronize) independently: one ID's failure never aborts or reorders
//! any other ID's outcome. Only a source configuration error, which
//! affects every ID identically, fails the batch as a whole.

use std::future::Future;
use std::sync::Arc;

use futures::future;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

use its_cache::ResponseCache;
use its_model::{ItsId, LocalUserProfile};
use its_roster::MembershipListStore;
use its_source::{IdentitySource, SourceError};

use crate::error::AuthError;
use crate::resolver::resolve;
use crate::synchronizer::ProfileSynchronizer;

/// Per-ID result of a bulk reconciliation.
///
/// Every variant keeps the submitted ID so callers can render one row
/// per input, and the list index always corresponds to the input index.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SyncOutcome {
    /// The pipeline completed and the profile was synchronized.
    Success {
        /// Registry ID.
        id: ItsId,
        /// The reconciled profile.
        profile: LocalUserProfile,
    },
    /// The source has no record for this ID.
    NotFound {
        /// Registry ID.
        id: ItsId,
    },
    /// The submitted ID (or the source's answer for it) failed
    /// validation.
    ValidationError {
        /// The raw input as submitted.
        id: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The source stayed silent past its budget; worth retrying later.
    Timeout {
        /// Registry ID.
        id: ItsId,
        /// Last failure detail.
        reason: String,
    },
}

impl SyncOutcome {
    /// Returns the submitted ID as text.
    #[must_use]
    pub fn raw_id(&self) -> &str {
        match self {
            Self::Success { id, .. } | Self::NotFound { id } | Self::Timeout { id, .. } => {
                id.as_str()
            }
            Self::ValidationError { id, .. } => id,
        }
    }

    /// Returns true for a synchronized profile.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the outcome tag, for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::NotFound { .. } => "not-found",
            Self::ValidationError { .. } => "validation-error",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// Counters folded from a batch of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Outcomes considered.
    pub attempted: usize,
    /// Profiles synchronized.
    pub succeeded: usize,
    /// IDs with no record.
    pub not_found: usize,
    /// Inputs rejected before or during the fetch.
    pub invalid: usize,
    /// IDs the source never answered for.
    pub timed_out: usize,
}

impl ReconcileSummary {
    /// Folds a summary over a batch of outcomes.
    #[must_use]
    pub fn from_outcomes(outcomes: &[SyncOutcome]) -> Self {
        let mut summary = Self {
            attempted: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome {
                SyncOutcome::Success { .. } => summary.succeeded += 1,
                SyncOutcome::NotFound { .. } => summary.not_found += 1,
                SyncOutcome::ValidationError { .. } => summary.invalid += 1,
                SyncOutcome::Timeout { .. } => summary.timed_out += 1,
            }
        }
        summary
    }

    /// Outcomes that did not synchronize a profile.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.not_found + self.invalid + self.timed_out
    }
}

/// Resolves many IDs concurrently, isolating per-ID failures.
pub struct BulkReconciliationService {
    source: Arc<dyn IdentitySource>,
    cache: Arc<ResponseCache>,
    overrides: Arc<MembershipListStore>,
    synchronizer: ProfileSynchronizer,
    max_in_flight: usize,
}

impl BulkReconciliationService {
    /// Creates a service with the given in-flight bound.
    #[must_use]
    pub fn new(
        source: Arc<dyn IdentitySource>,
        cache: Arc<ResponseCache>,
        overrides: Arc<MembershipListStore>,
        synchronizer: ProfileSynchronizer,
        max_in_flight: usize,
    ) -> Self {
        Self {
            source,
            cache,
            overrides,
            synchronizer,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Reconciles every ID, returning one outcome per input in input
    /// order regardless of completion order.
    ///
    /// ## Errors
    ///
    /// Only [`AuthError::Configuration`] fails the batch; every other
    /// failure is recorded in its ID's outcome.
    pub async fn reconcile_many(&self, ids: &[String]) -> Result<Vec<SyncOutcome>, AuthError> {
        self.reconcile_until(ids, future::pending::<()>()).await
    }

    /// Reconciles IDs until `cancel` resolves.
    ///
    /// Cancellation stops drawing new IDs from the input; pipelines
    /// already in flight run to completion so finished work is not
    /// discarded. The returned outcomes are the completed prefix, still
    /// in input order.
    ///
    /// ## Errors
    ///
    /// As [`BulkReconciliationService::reconcile_many`].
    pub async fn reconcile_until<C>(
        &self,
        ids: &[String],
        cancel: C,
    ) -> Result<Vec<SyncOutcome>, AuthError>
    where
        C: Future<Output = ()>,
    {
        let outcomes: Vec<SyncOutcome> = stream::iter(ids.iter().cloned())
            .take_until(cancel)
            .map(|raw| self.reconcile_one(raw))
            .buffered(self.max_in_flight)
            .try_collect()
            .await?;

        if outcomes.len() < ids.len() {
            tracing::warn!(
                completed = outcomes.len(),
                requested = ids.len(),
                "bulk reconciliation cancelled before completion"
            );
        }

        let summary = ReconcileSummary::from_outcomes(&outcomes);
        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            "bulk reconciliation finished"
        );
        Ok(outcomes)
    }

    async fn reconcile_one(&self, raw: String) -> Result<SyncOutcome, AuthError> {
        let id: ItsId = match raw.parse() {
            Ok(id) => id,
            Err(err) => {
                return Ok(SyncOutcome::ValidationError {
                    id: raw,
                    reason: err.to_string(),
                })
            }
        };

        let source = Arc::clone(&self.source);
        let fetch_id = id.clone();
        let fetched = self
            .cache
            .get_or_fetch(&id, move || async move { source.fetch(&fetch_id).await })
            .await;

        match fetched {
            Ok(record) => {
                let role = resolve(&record, &self.overrides);
                let profile = self.synchronizer.sync(&record, role).await;
                Ok(SyncOutcome::Success { id, profile })
            }
            Err(SourceError::NotFound(_)) => {
                // An existing profile keeps its attributes but is marked
                // so readers can see the record is gone upstream.
                self.synchronizer.mark_failed(&id).await;
                Ok(SyncOutcome::NotFound { id })
            }
            Err(SourceError::Timeout(reason)) => {
                self.synchronizer.mark_stale(&id).await;
                Ok(SyncOutcome::Timeout { id, reason })
            }
            Err(SourceError::Validation(reason)) => {
                Ok(SyncOutcome::ValidationError { id: raw, reason })
            }
            Err(SourceError::Configuration(msg)) => Err(AuthError::Configuration(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::sleep;

    use its_model::IdentityRecord;
    use its_source::{SourceResult, SyntheticIdentitySource};

    use crate::profile_store::InMemoryProfileStore;

    use super::*;

    /// What a scripted source does for one ID.
    #[derive(Debug, Clone)]
    enum Script {
        Ok { delay_ms: u64 },
        NotFound,
        Timeout,
        Misconfigured,
    }

    /// Test double with per-ID behavior and concurrency accounting.
    struct ScriptedSource {
        scripts: HashMap<String, Script>,
        fetch_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight_seen: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(scripts: impl IntoIterator<Item = (&'static str, Script)>) -> Self {
            Self {
                scripts: scripts
                    .into_iter()
                    .map(|(id, s)| (id.to_string(), s))
                    .collect(),
                fetch_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight_seen: AtomicUsize::new(0),
            }
        }

        fn record(id: &ItsId) -> IdentityRecord {
            SyntheticIdentitySource::new(6).record_for(id)
        }
    }

    #[async_trait]
    impl IdentitySource for ScriptedSource {
        fn kind(&self) -> &'static str {
            "scripted"
        }

        async fn fetch(&self, id: &ItsId) -> SourceResult<IdentityRecord> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight_seen.fetch_max(now, Ordering::SeqCst);

            let script = self
                .scripts
                .get(id.as_str())
                .cloned()
                .unwrap_or(Script::Ok { delay_ms: 0 });
            let result = match script {
                Script::Ok { delay_ms } => {
                    if delay_ms > 0 {
                        sleep(Duration::from_millis(delay_ms)).await;
                    }
                    Ok(Self::record(id))
                }
                Script::NotFound => Err(SourceError::NotFound(id.clone())),
                Script::Timeout => Err(SourceError::timeout("scripted timeout")),
                Script::Misconfigured => Err(SourceError::config("scripted misconfiguration")),
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn search(&self, _query: &str) -> SourceResult<Vec<IdentityRecord>> {
            Ok(Vec::new())
        }

        async fn validate_credentials(&self, _id: &ItsId, _secret: &str) -> SourceResult<bool> {
            Ok(true)
        }
    }

    fn service(source: Arc<ScriptedSource>, max_in_flight: usize) -> BulkReconciliationService {
        BulkReconciliationService::new(
            source,
            Arc::new(ResponseCache::new(Duration::from_secs(300))),
            Arc::new(MembershipListStore::new()),
            ProfileSynchronizer::new(Arc::new(InMemoryProfileStore::new())),
            max_in_flight,
        )
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn one_failure_suppresses_nothing() {
        let source = Arc::new(ScriptedSource::new([
            ("11111111", Script::Ok { delay_ms: 0 }),
            ("22222222", Script::NotFound),
            ("33333333", Script::Ok { delay_ms: 0 }),
        ]));
        let svc = service(Arc::clone(&source), 4);

        let outcomes = svc
            .reconcile_many(&ids(&["11111111", "22222222", "33333333"]))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(matches!(outcomes[1], SyncOutcome::NotFound { .. }));
        assert!(outcomes[2].is_success());
        assert_eq!(
            outcomes.iter().map(SyncOutcome::raw_id).collect::<Vec<_>>(),
            vec!["11111111", "22222222", "33333333"]
        );
    }

    #[tokio::test]
    async fn malformed_ids_never_reach_the_source() {
        let source = Arc::new(ScriptedSource::new([]));
        let svc = service(Arc::clone(&source), 4);

        let outcomes = svc
            .reconcile_many(&ids(&["11111111", "bogus", "1234"]))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[1], SyncOutcome::ValidationError { .. }));
        assert!(matches!(outcomes[2], SyncOutcome::ValidationError { .. }));
        assert_eq!(source.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn outcomes_keep_input_order_despite_completion_order() {
        // First id finishes last; order must still match the input.
        let source = Arc::new(ScriptedSource::new([
            ("11111111", Script::Ok { delay_ms: 50 }),
            ("22222222", Script::Ok { delay_ms: 1 }),
            ("33333333", Script::Ok { delay_ms: 1 }),
        ]));
        let svc = service(Arc::clone(&source), 3);

        let outcomes = svc
            .reconcile_many(&ids(&["11111111", "22222222", "33333333"]))
            .await
            .unwrap();

        assert_eq!(
            outcomes.iter().map(SyncOutcome::raw_id).collect::<Vec<_>>(),
            vec!["11111111", "22222222", "33333333"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_stays_within_the_bound() {
        let source = Arc::new(ScriptedSource::new([
            ("10000001", Script::Ok { delay_ms: 10 }),
            ("10000002", Script::Ok { delay_ms: 10 }),
            ("10000003", Script::Ok { delay_ms: 10 }),
            ("10000004", Script::Ok { delay_ms: 10 }),
            ("10000005", Script::Ok { delay_ms: 10 }),
            ("10000006", Script::Ok { delay_ms: 10 }),
        ]));
        let svc = service(Arc::clone(&source), 2);

        let outcomes = svc
            .reconcile_many(&ids(&[
                "10000001", "10000002", "10000003", "10000004", "10000005", "10000006",
            ]))
            .await
            .unwrap();

        assert_eq!(outcomes.len(), 6);
        assert!(source.max_in_flight_seen.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn timeouts_mark_existing_profiles_stale() {
        let source = Arc::new(ScriptedSource::new([(
            "11111111",
            Script::Ok { delay_ms: 0 },
        )]));
        let svc = service(Arc::clone(&source), 2);

        // Seed the profile, then script a timeout for the refresh.
        svc.reconcile_many(&ids(&["11111111"])).await.unwrap();
        svc.cache.invalidate_all();

        let flaky = Arc::new(ScriptedSource::new([("11111111", Script::Timeout)]));
        let svc2 = BulkReconciliationService::new(
            flaky,
            Arc::new(ResponseCache::new(Duration::from_secs(300))),
            Arc::clone(&svc.overrides),
            svc.synchronizer.clone(),
            2,
        );

        let outcomes = svc2.reconcile_many(&ids(&["11111111"])).await.unwrap();
        assert!(matches!(outcomes[0], SyncOutcome::Timeout { .. }));

        let id = ItsId::new("11111111").unwrap();
        let profile = svc.synchronizer.store().get(&id).await.unwrap();
        assert_eq!(profile.sync_status, its_model::SyncStatus::Stale);
        assert_eq!(profile.first_name.is_empty(), false, "attributes retained");
    }

    #[tokio::test]
    async fn configuration_errors_fail_the_whole_batch() {
        let source = Arc::new(ScriptedSource::new([(
            "11111111",
            Script::Misconfigured,
        )]));
        let svc = service(source, 2);

        let err = svc
            .reconcile_many(&ids(&["11111111", "22222222"]))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Configuration(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_keeps_the_completed_prefix() {
        let source = Arc::new(ScriptedSource::new([
            ("10000001", Script::Ok { delay_ms: 10 }),
            ("10000002", Script::Ok { delay_ms: 10 }),
            ("10000003", Script::Ok { delay_ms: 10 }),
            ("10000004", Script::Ok { delay_ms: 10 }),
            ("10000005", Script::Ok { delay_ms: 10 }),
        ]));
        let svc = service(Arc::clone(&source), 2);

        let all = ids(&["10000001", "10000002", "10000003", "10000004", "10000005"]);
        let outcomes = svc
            .reconcile_until(&all, async {
                sleep(Duration::from_millis(5)).await;
            })
            .await
            .unwrap();

        assert!(!outcomes.is_empty(), "in-flight work is kept");
        assert!(outcomes.len() < all.len(), "no new ids after cancel");
        for (outcome, expected) in outcomes.iter().zip(all.iter()) {
            assert_eq!(outcome.raw_id(), expected);
        }
    }

    #[tokio::test]
    async fn summary_folds_match_the_outcomes() {
        let source = Arc::new(ScriptedSource::new([
            ("11111111", Script::Ok { delay_ms: 0 }),
            ("22222222", Script::NotFound),
            ("33333333", Script::Timeout),
        ]));
        let svc = service(source, 4);

        let outcomes = svc
            .reconcile_many(&ids(&["11111111", "22222222", "33333333", "oops"]))
            .await
            .unwrap();
        let summary = ReconcileSummary::from_outcomes(&outcomes);

        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.failed(), 3);
    }
}
