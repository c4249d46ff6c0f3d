//! Keyed result cache with freshness and garbage-collection windows.
//!
//! An entry is fresh for `stale_time` after it was written and is served
//! without calling the fetcher. Once stale it is refetched on the next read
//! and evicted `gc_time` after it went stale. Writes are last-writer-wins: a
//! slow fetch that lands after a newer one overwrites it.
//!
//! Concurrent reads of one key share a single fetch. If the caller running
//! that fetch is cancelled, a waiting reader takes it over.

use std::{
    collections::HashMap,
    fmt::Debug,
    future::Future,
    hash::Hash,
    sync::{Mutex as SyncMutex, PoisonError},
};

use tokio::{
    sync::{watch, Mutex},
    time::Instant,
};
use tracing::debug;

use crate::config::CachePolicy;

struct CacheEntry<V> {
    value: V,
    updated_at: Instant,
    invalidated: bool,
}

/// Non-fetching view of one key.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot<V> {
    pub value: Option<V>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

pub struct QueryCache<K, V> {
    policy: CachePolicy,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    in_flight: SyncMutex<HashMap<K, watch::Receiver<Option<V>>>>,
}

enum Flight<V> {
    Lead(watch::Sender<Option<V>>),
    Join(watch::Receiver<Option<V>>),
}

/// Clears the in-flight marker of the fetch it leads, including when the
/// leading future is dropped before completing.
struct FlightGuard<'a, K: Eq + Hash, V> {
    in_flight: &'a SyncMutex<HashMap<K, watch::Receiver<Option<V>>>>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for FlightGuard<'_, K, V> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(HashMap::new()),
            in_flight: SyncMutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Returns the cached value while it is fresh, otherwise runs `fetcher`
    /// and stores its result. A read that finds a fetch already running for
    /// `key` waits for that fetch instead of starting its own.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetcher: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        loop {
            if let Some(value) = self.fresh_value(&key).await {
                debug!(?key, "query cache hit");
                return value;
            }

            match self.join_or_lead(&key) {
                Flight::Join(mut rx) => {
                    debug!(?key, "joining in-flight query");
                    let shared = match rx.wait_for(Option::is_some).await {
                        Ok(value) => value.clone(),
                        Err(_) => None,
                    };
                    if let Some(value) = shared {
                        return value;
                    }
                    // The leading fetch was cancelled; try again.
                }
                Flight::Lead(tx) => {
                    let _guard = FlightGuard {
                        in_flight: &self.in_flight,
                        key: key.clone(),
                    };
                    debug!(?key, "query cache miss, fetching");
                    let value = fetcher().await;
                    self.store(key.clone(), value.clone()).await;
                    tx.send_replace(Some(value.clone()));
                    return value;
                }
            }
        }
    }

    pub async fn store(&self, key: K, value: V) {
        self.entries.lock().await.insert(
            key,
            CacheEntry {
                value,
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    pub async fn snapshot(&self, key: &K) -> CacheSnapshot<V> {
        let now = Instant::now();
        let is_fetching = self.is_in_flight(key);
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, now);

        match entries.get(key) {
            Some(entry) => CacheSnapshot {
                value: Some(entry.value.clone()),
                is_fetching,
                is_stale: !self.is_fresh(entry, now),
            },
            None => CacheSnapshot {
                value: None,
                is_fetching,
                is_stale: true,
            },
        }
    }

    /// Marks `key` stale so the next read refetches it.
    pub async fn invalidate(&self, key: &K) {
        if let Some(entry) = self.entries.lock().await.get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Window focus only forces refetches when the policy asks for it.
    pub async fn notify_window_focus(&self) {
        if !self.policy.refetch_on_window_focus {
            return;
        }
        for entry in self.entries.lock().await.values_mut() {
            entry.invalidated = true;
        }
    }

    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, Instant::now());
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn fresh_value(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        self.evict_expired(&mut entries, now);
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    fn join_or_lead(&self, key: &K) -> Flight<V> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(rx) = in_flight.get(key) {
            return Flight::Join(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        in_flight.insert(key.clone(), rx);
        Flight::Lead(tx)
    }

    fn is_in_flight(&self, key: &K) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        !entry.invalidated && now.duration_since(entry.updated_at) < self.policy.stale_time
    }

    fn evict_expired(&self, entries: &mut HashMap<K, CacheEntry<V>>, now: Instant) {
        let retention = self.policy.stale_time + self.policy.gc_time;
        entries.retain(|key, entry| {
            let keep = now.duration_since(entry.updated_at) < retention;
            if !keep {
                debug!(?key, "evicting expired query");
            }
            keep
        });
    }
}

#[cfg(test)]
#[path = "tests/query_cache_tests.rs"]
mod tests;
