//! Generic key/value cache with per-entry TTL expiration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::CacheConfig;

/// Entry stored in the cache.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub value: V,

    /// When this entry was inserted.
    pub created_at: Instant,

    /// When this entry stops being served.
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if the entry is past its expiry.
    pub fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Key/value cache with per-entry time-to-live.
///
/// Expired entries are evicted lazily when observed by [`get`] or
/// [`contains`], and in bulk by [`cleanup`] (run periodically via
/// [`spawn_cleanup_task`]) for entries that are never read again.
///
/// There is no size bound and no LRU eviction; expiry is the only
/// eviction policy. A process inserting many distinct keys grows until
/// the next sweep.
///
/// Cloning is cheap and clones share one underlying store.
///
/// [`get`]: TtlCache::get
/// [`contains`]: TtlCache::contains
/// [`cleanup`]: TtlCache::cleanup
/// [`spawn_cleanup_task`]: TtlCache::spawn_cleanup_task
pub struct TtlCache<V> {
    inner: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    config: CacheConfig,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    /// Create a new cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert a value under `key` with the default TTL.
    ///
    /// Any existing entry under the same key is overwritten.
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, self.config.default_ttl)
            .await;
    }

    /// Insert a value under `key` with an explicit TTL.
    pub async fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        let mut inner = self.inner.write().await;
        inner.insert(key.clone(), CacheEntry::new(value, ttl));
        trace!(key = %key, ttl_ms = ttl.as_millis() as u64, "cache insert");
    }

    /// Get a value by key.
    ///
    /// An expired entry observed here is evicted as a side effect and
    /// reported as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        match inner.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!(key = %key, "cache entry expired, evicting");
                inner.remove(key);
                None
            }
            Some(entry) => {
                trace!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    /// Check whether a live entry exists for `key`.
    ///
    /// Applies the same validity check and eviction side effect as
    /// [`get`](TtlCache::get).
    pub async fn contains(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!(key = %key, "cache entry expired, evicting");
                inner.remove(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Remove an entry by key.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        inner.remove(key).map(|e| e.value)
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.clear();
    }

    /// Get the number of entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Evict every expired entry, read or not, and return the count.
    pub async fn cleanup(&self) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|_, entry| !entry.is_expired());
        let evicted = before - inner.len();
        if evicted > 0 {
            debug!(evicted, remaining = inner.len(), "cache sweep");
        }
        evicted
    }

    /// Spawn a background task running [`cleanup`](TtlCache::cleanup)
    /// on the configured interval.
    ///
    /// The task runs until the returned handle is aborted or dropped
    /// with the runtime.
    pub fn spawn_cleanup_task(&self) -> JoinHandle<()> {
        let cache = self.clone();
        let period = self.config.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.cleanup().await;
            }
        })
    }
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}
