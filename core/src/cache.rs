//! Single-flight, per-key, time-expiring cache.
//!
//! Used to memoize `kubectl get pods` so that every mapping loop of a
//! namespace shares one invocation. Concurrent callers on the same key join
//! the fetch already in flight; callers on different keys never wait on each
//! other, because the key map lock is only held to look up the per-key cell.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tokio::time::Instant;

/// How long a freshly produced value stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Serve the value until the duration has elapsed.
    After(Duration),
    /// Hand the value to the callers of this fetch only, then forget it.
    Now,
}

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// One fetch per key; cells are replaced once their value expires.
type Flight<V> = Arc<OnceCell<CacheEntry<V>>>;

/// Single-flight cache keyed by `K`.
pub struct ResolutionCache<K, V> {
    flights: Mutex<HashMap<K, Flight<V>>>,
}

impl<K, V> ResolutionCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, running `factory` when there is none.
    ///
    /// `factory` runs at most once at a time per key. Callers arriving while
    /// it runs wait for it and receive the same value, even when the factory
    /// marks that value as [`Expiry::Now`].
    pub async fn get_or_create<F, Fut>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = (V, Expiry)>,
    {
        let flight = self.flight_for(key);
        let entry = flight
            .get_or_init(|| async move {
                let (value, expiry) = factory().await;
                let now = Instant::now();
                let expires_at = match expiry {
                    Expiry::After(ttl) => now + ttl,
                    Expiry::Now => now,
                };
                CacheEntry { value, expires_at }
            })
            .await;
        entry.value.clone()
    }

    /// Evicts `key`. A fetch already in flight still completes for its callers.
    pub fn remove(&self, key: &K) {
        self.flights.lock().remove(key);
    }

    /// Evicts every key matching `predicate`.
    pub fn remove_where<P>(&self, predicate: P)
    where
        P: Fn(&K) -> bool,
    {
        self.flights.lock().retain(|key, _| !predicate(key));
    }

    /// Number of keys currently tracked, fresh or in flight.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.flights
            .lock()
            .values()
            .filter(|flight| flight.get().map_or(true, |entry| !entry.is_expired(now)))
            .count()
    }

    /// Returns true if no key is fresh or in flight.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn flight_for(&self, key: K) -> Flight<V> {
        let now = Instant::now();
        let mut flights = self.flights.lock();

        if let Some(flight) = flights.get(&key) {
            // Still in flight, or resolved and fresh.
            if flight.get().map_or(true, |entry| !entry.is_expired(now)) {
                return Arc::clone(flight);
            }
        }

        let flight = Arc::new(OnceCell::new());
        flights.insert(key, Arc::clone(&flight));
        flight
    }
}

impl<K, V> Default for ResolutionCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
