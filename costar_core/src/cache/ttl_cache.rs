//! Generic in-memory cache with per-entry expiry
//!
//! Expired entries are treated as absent on read and removed at that point;
//! [`TtlCache::purge_expired`] removes the rest in bulk. Concurrent
//! [`TtlCache::get_or_compute`] calls for the same cold key share a single
//! producer run.

use crate::cache::{CacheEntry, CacheStats};
use log::trace;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tokio::time::Instant;

/// In-memory key/value cache where every entry carries its own TTL
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    /// Producer runs currently in progress, one cell per key
    in_flight: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create an unbounded cache
    pub fn new() -> Self {
        Self::with_max_entries(None)
    }

    /// Create a cache that evicts once it holds `max_entries` entries
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Get a fresh value, removing the entry if it has expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        let Some(entry) = entries.get_mut(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!("Cache miss for {key:?}");
            return None;
        };

        if entry.is_expired(now) {
            entries.remove(key);
            self.misses.fetch_add(1, Ordering::Relaxed);
            trace!("Cache entry for {key:?} expired");
            return None;
        }

        entry.last_accessed = now;
        self.hits.fetch_add(1, Ordering::Relaxed);
        trace!("Cache hit for {key:?}");
        Some(entry.value.clone())
    }

    /// Read a fresh value without touching statistics or access times
    async fn peek(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Store a value that expires `ttl` from now, replacing any previous entry
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.entries.write().await;

        if let Some(max) = self.max_entries
            && entries.len() >= max
            && !entries.contains_key(&key)
        {
            self.evict_for_insert(&mut entries, max);
        }

        entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Return the cached value, or run `producer` and cache its result
    ///
    /// Callers racing on the same cold key wait for one producer run instead
    /// of each calling upstream. A failed producer caches nothing; its error
    /// goes to the caller whose producer ran, and any waiter runs its own.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }

        let cell = {
            let mut in_flight = self.in_flight.lock().await;
            let slot = in_flight.entry(key.clone()).or_default();
            // An initialized cell is left over from a caller cancelled before
            // cleanup; its value already missed in `entries`, so start over
            if slot.initialized() {
                *slot = Arc::default();
            }
            slot.clone()
        };

        let result = cell
            .get_or_try_init(|| async {
                // A previous flight may have finished between our miss and now
                if let Some(value) = self.peek(&key).await {
                    return Ok(value);
                }
                let value = producer().await?;
                self.set(key.clone(), value.clone(), ttl).await;
                Ok(value)
            })
            .await
            .cloned();

        let mut in_flight = self.in_flight.lock().await;
        if in_flight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            in_flight.remove(&key);
        }

        result
    }

    /// Drop every entry and reset statistics
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
    }

    /// Physically remove expired entries, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until purged
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.len().await,
            hit_count: self.hits.load(Ordering::Relaxed),
            miss_count: self.misses.load(Ordering::Relaxed),
            eviction_count: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Make room for one insert: expired entries go first, then the least
    /// recently accessed ones
    fn evict_for_insert(&self, entries: &mut HashMap<K, CacheEntry<V>>, max: usize) {
        let now = Instant::now();
        entries.retain(|_, entry| !entry.is_expired(now));

        while entries.len() >= max {
            let Some(oldest_key) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            entries.remove(&oldest_key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            trace!("Evicted least recently used entry {oldest_key:?}");
        }
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
