//! Client Query Cache
//!
//! Session-scoped companion of the server cache. Keys and TTL discipline
//! match the server side; on top of that the store is bounded (oldest write
//! evicted first), mirrored to a `CacheStorage` record after every mutation,
//! and warmed by speculative prefetch of the next pages.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::{encode_listing, system_clock, CacheEntry, SharedClock, TtlStore, ANONYMOUS};
use crate::client::{CacheStorage, ClientError, QuestionsFetcher};
use crate::models::{ListingQuery, QuestionsResponse};

// == Client Cache Config ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCacheConfig {
    /// Bound on stored pages
    pub max_entries: usize,
    pub ttl: Duration,
    /// Pages fetched ahead of the current one
    pub prefetch_distance: u32,
    /// Name of the persisted record
    pub storage_key: String,
}

impl Default for ClientCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 50,
            ttl: Duration::from_secs(5 * 60),
            prefetch_distance: 2,
            storage_key: "questions-cache".to_string(),
        }
    }
}

/// A cached page and the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPage {
    pub query: ListingQuery,
    pub response: QuestionsResponse,
}

type PersistedEntries = HashMap<String, CacheEntry<CachedPage>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    /// Length of the persisted JSON record
    pub approx_bytes: usize,
    pub max_entries: usize,
    pub ttl_ms: u64,
}

/// Clears a flag when dropped.
struct FlagGuard<'a>(&'a AtomicBool);

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Removes a key from the prefetch queue when dropped, whatever the fetch outcome.
struct QueueGuard<'a> {
    queue: &'a StdMutex<HashSet<String>>,
    key: String,
}

impl Drop for QueueGuard<'_> {
    fn drop(&mut self) {
        lock_queue(self.queue).remove(&self.key);
    }
}

fn lock_queue(queue: &StdMutex<HashSet<String>>) -> std::sync::MutexGuard<'_, HashSet<String>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// == Client Query Cache ==
pub struct ClientQueryCache {
    store: Mutex<TtlStore<CachedPage>>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn QuestionsFetcher>,
    /// Caller identity folded into every key
    identity: String,
    config: ClientCacheConfig,
    /// Keys with a prefetch in flight
    prefetch_queue: StdMutex<HashSet<String>>,
    prefetching: AtomicBool,
}

impl ClientQueryCache {
    // == Constructor ==
    /// Creates the cache and rehydrates it from `storage`, dropping expired entries.
    pub fn new(
        fetcher: Arc<dyn QuestionsFetcher>,
        storage: Arc<dyn CacheStorage>,
        identity: impl Into<String>,
        config: ClientCacheConfig,
    ) -> Self {
        Self::with_clock(fetcher, storage, identity, config, system_clock())
    }

    pub fn with_clock(
        fetcher: Arc<dyn QuestionsFetcher>,
        storage: Arc<dyn CacheStorage>,
        identity: impl Into<String>,
        config: ClientCacheConfig,
        clock: SharedClock,
    ) -> Self {
        let mut store = TtlStore::new(
            Some(config.max_entries),
            config.ttl.as_millis() as u64,
            clock,
        );
        rehydrate(&mut store, storage.as_ref(), &config.storage_key);

        Self {
            store: Mutex::new(store),
            storage,
            fetcher,
            identity: identity.into(),
            config,
            prefetch_queue: StdMutex::new(HashSet::new()),
            prefetching: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ClientCacheConfig {
        &self.config
    }

    pub fn key_for(&self, query: &ListingQuery) -> String {
        encode_listing(query, Some(&self.identity))
    }

    // == Get ==
    /// Returns the cached page if it is still fresh.
    pub async fn get(&self, query: &ListingQuery) -> Option<QuestionsResponse> {
        let key = self.key_for(query);
        let mut store = self.store.lock().await;
        let stored = store.entries().contains_key(&key);
        let response = store.get(&key).map(|entry| entry.value.response.clone());
        match &response {
            Some(_) => debug!(key = %key, "client cache hit"),
            None if stored => {
                debug!(key = %key, "client cache entry expired");
                self.persist(&store);
            }
            None => debug!(key = %key, "client cache miss"),
        }
        response
    }

    // == Set ==
    /// Stores a page with a fresh timestamp, evicting the oldest writes past the bound.
    ///
    /// Page-restricted responses carry page 1 rows and are never stored under
    /// the requested page's key.
    pub async fn set(&self, query: &ListingQuery, response: QuestionsResponse) {
        let key = self.key_for(query);
        if response.is_page_restricted {
            debug!(key = %key, "restricted page not cached");
            return;
        }
        let page = CachedPage {
            query: query.clone(),
            response,
        };
        let mut store = self.store.lock().await;
        let evicted = store.set(key, page, None);
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), "client cache evicted oldest pages");
        }
        self.persist(&store);
    }

    pub async fn contains_fresh(&self, query: &ListingQuery) -> bool {
        let key = self.key_for(query);
        self.store.lock().await.contains_fresh(&key)
    }

    // == Prefetch ==
    /// Fetches and stores up to `prefetch_distance` pages after `query.page`.
    ///
    /// Pages past the last page, pages already cached and pages already in
    /// flight are skipped. A call made while another sweep runs returns
    /// immediately. Failures are logged and dropped. Returns the number of
    /// pages stored. Anonymous clients only ever see page 1, so they never
    /// prefetch.
    pub async fn prefetch_next_pages(&self, query: &ListingQuery, total_count: u64) -> usize {
        if self.identity == ANONYMOUS {
            return 0;
        }
        if self
            .prefetching
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("prefetch already running, skipping");
            return 0;
        }
        let _running = FlagGuard(&self.prefetching);

        let total_pages = total_count.div_ceil(u64::from(query.limit.max(1)));
        let mut targets = Vec::new();
        {
            let store = self.store.lock().await;
            let mut queue = lock_queue(&self.prefetch_queue);
            for step in 1..=self.config.prefetch_distance {
                let page = query.page.saturating_add(step);
                if u64::from(page) > total_pages {
                    break;
                }
                let next = query.with_page(page);
                let key = self.key_for(&next);
                if store.contains_fresh(&key) || queue.contains(&key) {
                    continue;
                }
                queue.insert(key.clone());
                targets.push((key, next));
            }
        }

        let fetches = targets.into_iter().map(|(key, next)| async move {
            let _queued = QueueGuard {
                queue: &self.prefetch_queue,
                key,
            };
            match self.fetcher.fetch(&next).await {
                Ok(response) => {
                    self.set(&next, response).await;
                    debug!(page = next.page, "prefetched page");
                    true
                }
                Err(err) => {
                    warn!(page = next.page, "prefetch failed: {}", err);
                    false
                }
            }
        });

        join_all(fetches).await.into_iter().filter(|ok| *ok).count()
    }

    /// Number of prefetches currently in flight.
    pub fn pending_prefetches(&self) -> usize {
        lock_queue(&self.prefetch_queue).len()
    }

    // == Load Page ==
    /// Primary navigation path: serve from cache or fetch and store, then
    /// prefetch the following pages in the background.
    pub async fn load_page(
        self: &Arc<Self>,
        query: &ListingQuery,
    ) -> Result<QuestionsResponse, ClientError> {
        let response = match self.get(query).await {
            Some(response) => response,
            None => {
                let response = self.fetcher.fetch(query).await?;
                self.set(query, response.clone()).await;
                response
            }
        };

        let cache = Arc::clone(self);
        let query = query.clone();
        let total_count = response.total_count;
        tokio::spawn(async move {
            cache.prefetch_next_pages(&query, total_count).await;
        });

        Ok(response)
    }

    // == Maintenance ==
    /// Removes expired pages. Returns the number removed.
    pub async fn clear_expired(&self) -> usize {
        let mut store = self.store.lock().await;
        let removed = store.cleanup_expired();
        if removed > 0 {
            self.persist(&store);
        }
        removed
    }

    /// Empties the cache and deletes the persisted record.
    pub async fn clear_all(&self) {
        self.store.lock().await.clear();
        if let Err(err) = self.storage.remove(&self.config.storage_key) {
            warn!("failed to remove persisted client cache: {}", err);
        }
    }

    pub async fn stats(&self) -> ClientCacheStats {
        let store = self.store.lock().await;
        let total_entries = store.len();
        let valid_entries = store.fresh_len();
        let approx_bytes = serde_json::to_string(store.entries())
            .map(|json| json.len())
            .unwrap_or(0);
        ClientCacheStats {
            total_entries,
            valid_entries,
            expired_entries: total_entries - valid_entries,
            approx_bytes,
            max_entries: self.config.max_entries,
            ttl_ms: store.default_ttl_ms(),
        }
    }

    fn persist(&self, store: &TtlStore<CachedPage>) {
        let json = match serde_json::to_string(store.entries()) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize client cache: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.write(&self.config.storage_key, &json) {
            warn!("failed to persist client cache: {}", err);
        }
    }
}

fn rehydrate(store: &mut TtlStore<CachedPage>, storage: &dyn CacheStorage, storage_key: &str) {
    let raw = match storage.read(storage_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return,
        Err(err) => {
            warn!("failed to read persisted client cache: {}", err);
            return;
        }
    };
    let persisted: PersistedEntries = match serde_json::from_str(&raw) {
        Ok(persisted) => persisted,
        Err(err) => {
            warn!("discarding unreadable client cache record: {}", err);
            return;
        }
    };

    let now = store.now_ms();
    let mut fresh: Vec<_> = persisted
        .into_iter()
        .filter(|(_, entry)| !entry.is_expired(now))
        .collect();
    fresh.sort_by_key(|(_, entry)| entry.created_at);
    let restored = fresh.len();
    for (key, entry) in fresh {
        store.insert_entry(key, entry);
    }
    debug!(restored, "client cache rehydrated");
}
