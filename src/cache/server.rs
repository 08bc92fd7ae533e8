//! Server Query Cache
//!
//! Process-wide TTL memoization of listing responses and of the tag universe,
//! with bulk invalidation. One instance is constructed at startup and shared
//! through `AppState`; tests build a fresh one each.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{system_clock, CacheStats, SharedClock, TtlStore, FILTERS_KEY};
use crate::models::{FilterOptions, QuestionsResponse};

// == Cached Value ==
/// Values the server cache holds, one variant per key family.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Listing(Arc<QuestionsResponse>),
    Filters(Arc<FilterOptions>),
}

/// A fresh value together with its freshness metadata.
#[derive(Debug, Clone)]
pub struct CacheHit<T> {
    pub value: T,
    /// Write timestamp of the entry (Unix milliseconds)
    pub created_at: u64,
    /// Milliseconds until the entry expires
    pub remaining_ms: u64,
}

// == Server Query Cache ==
/// Thread-safe, unbounded TTL cache.
///
/// The store sits behind a single `RwLock`; `invalidate_all` takes the write
/// lock, so no reader can observe a half-cleared store.
///
/// The generation is bumped by every `invalidate_all` while the write lock is
/// held. A value computed before an invalidation carries the older generation
/// and is refused by `set_if_generation`.
#[derive(Debug, Clone)]
pub struct ServerQueryCache {
    store: Arc<RwLock<TtlStore<CachedValue>>>,
    generation: Arc<AtomicU64>,
}

impl ServerQueryCache {
    // == Constructor ==
    /// Creates an empty cache on the wall clock.
    pub fn new(default_ttl: Duration) -> Self {
        Self::with_clock(default_ttl, system_clock())
    }

    /// Creates an empty cache on the given clock.
    pub fn with_clock(default_ttl: Duration, clock: SharedClock) -> Self {
        let store = TtlStore::new(None, default_ttl.as_millis() as u64, clock);
        Self {
            store: Arc::new(RwLock::new(store)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current invalidation generation. Read it before computing a value
    /// that will be passed to `set_if_generation`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    // == Get ==
    /// Returns the value stored under `key` if it is still fresh.
    ///
    /// Expired entries are evicted by this call.
    pub async fn get(&self, key: &str) -> Option<CacheHit<CachedValue>> {
        let mut store = self.store.write().await;
        let now = store.now_ms();
        let hit = store.get(key).map(|entry| CacheHit {
            value: entry.value.clone(),
            created_at: entry.created_at,
            remaining_ms: entry.ttl_remaining_ms(now),
        });
        match &hit {
            Some(_) => debug!(key, "server cache hit"),
            None => debug!(key, "server cache miss"),
        }
        hit
    }

    /// Typed lookup of a listing response.
    pub async fn get_listing(&self, key: &str) -> Option<CacheHit<Arc<QuestionsResponse>>> {
        let CacheHit {
            value,
            created_at,
            remaining_ms,
        } = self.get(key).await?;
        match value {
            CachedValue::Listing(response) => Some(CacheHit {
                value: response,
                created_at,
                remaining_ms,
            }),
            CachedValue::Filters(_) => None,
        }
    }

    /// Typed lookup of the tag universe.
    pub async fn get_filters(&self) -> Option<Arc<FilterOptions>> {
        match self.get(FILTERS_KEY).await?.value {
            CachedValue::Filters(filters) => Some(filters),
            CachedValue::Listing(_) => None,
        }
    }

    // == Set ==
    /// Stores a value with a fresh timestamp, using the default TTL when `ttl` is `None`.
    ///
    /// Returns the entry's write timestamp.
    pub async fn set(&self, key: impl Into<String>, value: CachedValue, ttl: Option<Duration>) -> u64 {
        let key = key.into();
        let mut store = self.store.write().await;
        let created_at = store.now_ms();
        store.set(key.clone(), value, ttl.map(|t| t.as_millis() as u64));
        debug!(key = %key, "server cache set");
        created_at
    }

    /// Stores a value only if no invalidation happened since `generation` was read.
    ///
    /// Returns the entry's write timestamp, or `None` when the value is stale.
    pub async fn set_if_generation(
        &self,
        key: impl Into<String>,
        value: CachedValue,
        ttl: Option<Duration>,
        generation: u64,
    ) -> Option<u64> {
        let key = key.into();
        let mut store = self.store.write().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(key = %key, "server cache set skipped, invalidated meanwhile");
            return None;
        }
        let created_at = store.now_ms();
        store.set(key.clone(), value, ttl.map(|t| t.as_millis() as u64));
        debug!(key = %key, "server cache set");
        Some(created_at)
    }

    // == Invalidate All ==
    /// Drops every entry, including the tag universe.
    ///
    /// Returns the number of entries removed.
    pub async fn invalidate_all(&self) -> usize {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        let removed = store.clear();
        drop(store);
        info!("Server cache invalidated: {} entries removed", removed);
        removed
    }

    // == Stats ==
    /// Snapshot of stored keys and counters. Expired but unswept keys are included.
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        CacheStats::new(store.keys(), store.counters())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}
