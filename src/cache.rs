// Profile cache: bounded LRU with a sliding TTL
// Keeps Mojang lookups from hammering the API when the same player is queried repeatedly

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;

/// Default capacity bound
pub const DEFAULT_MAX_ENTRIES: usize = 500;
/// Default sliding TTL (5 minutes)
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Cached payload and the last time it was read or written
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    last_access: Instant,
}

impl CacheEntry {
    fn new(value: Value) -> Self {
        Self {
            value,
            last_access: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

struct Inner {
    entries: LruCache<String, CacheEntry>,
    counters: Counters,
}

/// Thread-safe profile cache shared by the fetcher
///
/// Values are stored as opaque JSON so one instance can hold UUID lookups,
/// assembled profiles and name histories side by side.
pub struct ProfileCache {
    inner: Mutex<Inner>,
    /// Per-key locks for fetches currently in flight
    inflight: tokio::sync::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    max_entries: usize,
    ttl: Duration,
}

impl ProfileCache {
    /// Create a cache holding at most `max_entries` live entries
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                counters: Counters::default(),
            }),
            inflight: tokio::sync::Mutex::new(HashMap::new()),
            max_entries: capacity.get(),
            ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Nothing inside the critical sections can leave the LRU half-updated
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a value if present and not expired; a hit refreshes both its TTL and LRU position
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let ttl = self.ttl;

        let expired = match inner.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(ttl) => {
                entry.last_access = Instant::now();
                let value = entry.value.clone();
                inner.counters.hits += 1;
                tracing::debug!("Cache hit: {}", key);
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.entries.pop(key);
            inner.counters.expirations += 1;
            tracing::debug!("Cache expired: {}", key);
        }
        inner.counters.misses += 1;
        None
    }

    /// Typed variant of [`get`](Self::get); an entry that no longer decodes is treated as a miss
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry {}: {}", key, e);
                self.invalidate(key);
                None
            }
        }
    }

    /// Store a value, evicting the least recently used entry when full
    pub fn insert(&self, key: &str, value: Value) {
        let mut inner = self.lock();
        if let Some((evicted_key, _)) = inner.entries.push(key.to_string(), CacheEntry::new(value)) {
            // push also hands back the old value when the key was already present
            if evicted_key != key {
                inner.counters.evictions += 1;
                tracing::debug!("Evicted least recently used entry: {}", evicted_key);
            }
        }
        tracing::debug!("Cached: {}", key);
    }

    /// Serialize and store a value
    pub fn insert_as<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value)?;
        self.insert(key, value);
        Ok(())
    }

    /// Remove an entry, returning whether one was present
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.pop(key).is_some()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn cleanup_expired(&self) -> usize {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let ttl = self.ttl;

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.pop(key);
        }
        inner.counters.expirations += expired.len() as u64;

        if !expired.is_empty() {
            tracing::debug!("Cleaned up {} expired cache entries", expired.len());
        }
        expired.len()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
        tracing::debug!("Cleared profile cache");
    }

    /// Number of stored entries, including ones that expired but were not yet touched
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains(key)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            max_entries: self.max_entries,
            ttl_seconds: self.ttl.as_secs(),
            hits: inner.counters.hits,
            misses: inner.counters.misses,
            evictions: inner.counters.evictions,
            expirations: inner.counters.expirations,
        }
    }

    /// Return the cached value for `key`, or run `fetch` and cache a `Some` result.
    ///
    /// Concurrent callers for the same key wait on one another, so only the first
    /// one reaches the network; the rest find the freshly cached value. `None`
    /// and errors are never cached.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, fetch: F) -> AppResult<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Option<T>>>,
    {
        if let Some(cached) = self.get_as(key) {
            return Ok(Some(cached));
        }

        let key_lock = self.key_lock(key).await;
        let _guard = key_lock.lock().await;

        if let Some(cached) = self.get_as(key) {
            return Ok(Some(cached));
        }

        let fetched = fetch().await?;
        if let Some(value) = &fetched {
            self.insert_as(key, value)?;
        }
        Ok(fetched)
    }

    async fn key_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        // Only the map holds locks nobody is waiting on
        inflight.retain(|_, lock| Arc::strong_count(lock) > 1);
        inflight.entry(key.to_string()).or_default().clone()
    }
}

impl Default for ProfileCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES, Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub max_entries: usize,
    pub ttl_seconds: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}
