//! Profile storage seam.
//!
//! The durable application database sits outside this subsystem, so the
//! store is a trait with an in-memory implementation; the synchronizer
//! only ever talks to the trait.

use async_trait::async_trait;
use dashmap::DashMap;

use its_model::{ItsId, LocalUserProfile};

/// Storage for reconciled profiles, keyed by registry ID.
///
/// Implementations must be thread-safe; both the single-login and bulk
/// paths write through the same store concurrently.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Gets the profile for an ID.
    async fn get(&self, id: &ItsId) -> Option<LocalUserProfile>;

    /// Inserts or replaces a profile.
    async fn put(&self, profile: LocalUserProfile);

    /// Removes a profile. Returns true if one existed. Exposed for the
    /// explicit administrative deletion path; nothing in this subsystem
    /// calls it during resolution.
    async fn remove(&self, id: &ItsId) -> bool;

    /// Number of stored profiles.
    async fn count(&self) -> usize;
}

/// Thread-safe in-memory profile store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<ItsId, LocalUserProfile>,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &ItsId) -> Option<LocalUserProfile> {
        self.profiles.get(id).map(|entry| entry.value().clone())
    }

    async fn put(&self, profile: LocalUserProfile) {
        self.profiles.insert(profile.its_id.clone(), profile);
    }

    async fn remove(&self, id: &ItsId) -> bool {
        self.profiles.remove(id).is_some()
    }

    async fn count(&self) -> usize {
        self.profiles.len()
    }
}

#[cfg(test)]
mod tests {
    use its_model::{IdentityRecord, Role};

    use super::*;

    fn profile(raw: &str) -> LocalUserProfile {
        let record = IdentityRecord {
            id: ItsId::new(raw).unwrap(),
            first_name: "Nadia".to_string(),
            middle_name: None,
            last_name: "Mirza".to_string(),
            email: "nadia@example.org".to_string(),
            phone: "+1-555-0104".to_string(),
            occupation: "Trader".to_string(),
            category: "Member".to_string(),
            address: "2 Willow Dr".to_string(),
            nationality: "Indian".to_string(),
            photo_ref: format!("photos/{raw}.jpg"),
        };
        LocalUserProfile::from_record(&record, Role::GeneralMember)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryProfileStore::new();
        let id = ItsId::new("12345678").unwrap();

        assert!(store.get(&id).await.is_none());
        store.put(profile("12345678")).await;

        let got = store.get(&id).await.unwrap();
        assert_eq!(got.its_id, id);
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn put_replaces_in_place() {
        let store = InMemoryProfileStore::new();
        let id = ItsId::new("12345678").unwrap();

        store.put(profile("12345678")).await;
        let mut updated = profile("12345678");
        updated.email = "changed@example.org".to_string();
        store.put(updated).await;

        assert_eq!(store.get(&id).await.unwrap().email, "changed@example.org");
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn remove_reports_existence() {
        let store = InMemoryProfileStore::new();
        let id = ItsId::new("12345678").unwrap();

        assert!(!store.remove(&id).await);
        store.put(profile("12345678")).await;
        assert!(store.remove(&id).await);
        assert_eq!(store.count().await, 0);
    }
}
