//! TTL-bound cache over identity lookups.
//!
//! Both successful fetches and missing-record answers are cached (a
//! repeated miss is still a registry round-trip worth saving); transient
//! failures are never cached. Entries expire strictly: nothing is
//! returned past its deadline. The tokio clock is used throughout so
//! tests can drive expiry with paused time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;

use its_model::{IdentityRecord, ItsId};
use its_source::{SourceError, SourceResult};

/// Cached answer for a single-ID lookup.
#[derive(Debug, Clone)]
enum RecordLookup {
    Found(IdentityRecord),
    Missing,
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Shared, time-bound cache over identity source lookups.
///
/// Concurrent misses for the same key are coalesced onto one fetch via a
/// per-key guard; even without the guard, map insertion is atomic and
/// last-writer-wins, so duplicate fetches can never corrupt state.
pub struct ResponseCache {
    ttl: Duration,
    records: DashMap<ItsId, Entry<RecordLookup>>,
    searches: DashMap<String, Entry<Vec<IdentityRecord>>>,
    record_flights: DashMap<ItsId, Arc<Mutex<()>>>,
    search_flights: DashMap<String, Arc<Mutex<()>>>,
}

impl ResponseCache {
    /// Creates a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            records: DashMap::new(),
            searches: DashMap::new(),
            record_flights: DashMap::new(),
            search_flights: DashMap::new(),
        }
    }

    /// Returns the configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up an ID, calling `fetcher` on a miss or expired entry.
    ///
    /// A cached missing-record answer is returned as
    /// [`SourceError::NotFound`] without touching the source.
    ///
    /// ## Errors
    ///
    /// Propagates the fetcher's error. Only `NotFound` results are
    /// cached; a `Timeout` leaves no entry, so the next caller retries
    /// the source.
    pub async fn get_or_fetch<F, Fut>(&self, id: &ItsId, fetcher: F) -> SourceResult<IdentityRecord>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<IdentityRecord>>,
    {
        if let Some(hit) = self.live_record(id) {
            return materialize(hit, id);
        }

        let guard = flight(&self.record_flights, id.clone());
        let _in_flight = guard.lock().await;

        // Re-check: another task may have filled the entry while we
        // waited on the guard.
        if let Some(hit) = self.live_record(id) {
            return materialize(hit, id);
        }

        match fetcher().await {
            Ok(record) => {
                self.store_record(id.clone(), RecordLookup::Found(record.clone()));
                Ok(record)
            }
            Err(SourceError::NotFound(missing)) => {
                tracing::debug!(id = %missing, "caching missing-record answer");
                self.store_record(id.clone(), RecordLookup::Missing);
                Err(SourceError::NotFound(missing))
            }
            Err(err) => Err(err),
        }
    }

    /// Looks up a search query, calling `fetcher` on a miss or expired
    /// entry. Result lists are cached under the query text.
    ///
    /// ## Errors
    ///
    /// Propagates the fetcher's error; failed searches are not cached.
    pub async fn search_or_fetch<F, Fut>(
        &self,
        query: &str,
        fetcher: F,
    ) -> SourceResult<Vec<IdentityRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<Vec<IdentityRecord>>>,
    {
        if let Some(hit) = self.live_search(query) {
            return Ok(hit);
        }

        let guard = flight(&self.search_flights, query.to_string());
        let _in_flight = guard.lock().await;

        if let Some(hit) = self.live_search(query) {
            return Ok(hit);
        }

        let results = fetcher().await?;
        self.searches.insert(
            query.to_string(),
            Entry {
                value: results.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(results)
    }

    /// Removes the entry for one ID.
    pub fn invalidate(&self, id: &ItsId) {
        self.records.remove(id);
        self.record_flights.remove(id);
    }

    /// Clears everything. Used when membership lists or source
    /// configuration change.
    pub fn invalidate_all(&self) {
        self.records.clear();
        self.searches.clear();
        self.record_flights.clear();
        self.search_flights.clear();
    }

    /// Number of entries currently held (live or awaiting expiry sweep).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len() + self.searches.len()
    }

    /// Returns true when the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_record(&self, id: &ItsId) -> Option<RecordLookup> {
        // The map guard must be released before removing an expired
        // entry from the same shard.
        let expired = match self.records.get(id) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.records.remove(id);
        }
        None
    }

    fn live_search(&self, query: &str) -> Option<Vec<IdentityRecord>> {
        let expired = match self.searches.get(query) {
            Some(entry) if entry.expires_at > Instant::now() => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.searches.remove(query);
        }
        None
    }

    fn store_record(&self, id: ItsId, value: RecordLookup) {
        self.records.insert(
            id,
            Entry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

fn materialize(hit: RecordLookup, id: &ItsId) -> SourceResult<IdentityRecord> {
    match hit {
        RecordLookup::Found(record) => Ok(record),
        RecordLookup::Missing => Err(SourceError::NotFound(id.clone())),
    }
}

fn flight<K>(flights: &DashMap<K, Arc<Mutex<()>>>, key: K) -> Arc<Mutex<()>>
where
    K: std::hash::Hash + Eq,
{
    let slot = flights.entry(key).or_insert_with(|| Arc::new(Mutex::new(())));
    Arc::clone(slot.value())
}
