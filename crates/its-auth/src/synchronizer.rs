//! Profile synchronization.
//!
//! Reconciles a freshly fetched identity record into the local profile:
//! create on first resolution, overwrite the synchronized attribute set
//! afterwards. The external source is always authoritative over those
//! fields; local edits to them do not survive a sync.

use std::sync::Arc;

use chrono::Utc;

use its_model::{IdentityRecord, ItsId, LocalUserProfile, Role, SyncStatus};

use crate::profile_store::ProfileStore;

/// Reconciles fetched records into stored profiles.
#[derive(Clone)]
pub struct ProfileSynchronizer {
    store: Arc<dyn ProfileStore>,
}

impl ProfileSynchronizer {
    /// Creates a synchronizer over a profile store.
    #[must_use]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    /// Creates or updates the profile for a record.
    ///
    /// Idempotent apart from `last_synced_at`: syncing the same record
    /// and role twice leaves every other field unchanged. A profile is
    /// never recreated; the original `created_at` survives every update.
    pub async fn sync(&self, record: &IdentityRecord, role: Role) -> LocalUserProfile {
        let profile = match self.store.get(&record.id).await {
            Some(mut existing) => {
                existing.apply_record(record);
                existing.role = role;
                existing.sync_status = SyncStatus::Fresh;
                existing.last_synced_at = Utc::now();
                existing
            }
            None => {
                tracing::debug!(id = %record.id, role = %role, "creating profile");
                LocalUserProfile::from_record(record, role)
            }
        };

        self.store.put(profile.clone()).await;
        profile
    }

    /// Marks an existing profile stale after a timed-out refresh. The
    /// retained attributes stay in place. Returns false when no profile
    /// exists yet.
    pub async fn mark_stale(&self, id: &ItsId) -> bool {
        self.mark(id, SyncStatus::Stale).await
    }

    /// Marks an existing profile failed after the source reported the
    /// record gone. Returns false when no profile exists yet.
    pub async fn mark_failed(&self, id: &ItsId) -> bool {
        self.mark(id, SyncStatus::Failed).await
    }

    async fn mark(&self, id: &ItsId, status: SyncStatus) -> bool {
        match self.store.get(id).await {
            Some(mut profile) => {
                profile.sync_status = status;
                self.store.put(profile).await;
                true
            }
            None => false,
        }
    }
}
