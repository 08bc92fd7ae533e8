//! Integration Tests for the client-side query cache
//!
//! Prefetch scheduling and de-duplication, persistence and the HTTP fetcher
//! against a live server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dsa_tracker::{
    cache::ManualClock,
    client::{
        CacheStorage, ClientCacheConfig, ClientError, ClientQueryCache, FileStorage,
        HttpFetcher, MemoryStorage, QuestionsFetcher, StorageError,
    },
    create_router,
    models::{Difficulty, FilterOptions, ListingQuery, QuestionInput, QuestionsResponse},
    repository::{InMemoryRepository, QuestionRepository},
    AppState, Config,
};
use reqwest::StatusCode;

// == Test Doubles ==

/// Serves `total_count` rows and records how often each page was fetched.
struct CountingFetcher {
    total_count: u64,
    delay: Duration,
    fail_pages: Vec<u32>,
    calls: Mutex<HashMap<u32, usize>>,
}

impl CountingFetcher {
    fn new(total_count: u64) -> Self {
        Self {
            total_count,
            delay: Duration::from_millis(0),
            fail_pages: Vec::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn failing_on(mut self, page: u32) -> Self {
        self.fail_pages.push(page);
        self
    }

    fn calls_for(&self, page: u32) -> usize {
        self.calls.lock().unwrap().get(&page).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl QuestionsFetcher for CountingFetcher {
    async fn fetch(&self, query: &ListingQuery) -> Result<QuestionsResponse, ClientError> {
        *self.calls.lock().unwrap().entry(query.page).or_insert(0) += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_pages.contains(&query.page) {
            return Err(ClientError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(QuestionsResponse {
            questions: vec![],
            total_count: self.total_count,
            filters: FilterOptions::default(),
            subscription: None,
            premium_required: false,
            is_authenticated: false,
            is_page_restricted: false,
        })
    }
}

/// Storage that rejects every operation.
struct BrokenStorage;

impl CacheStorage for BrokenStorage {
    fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn write(&self, _key: &str, _contents: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".to_string()))
    }
}

// == Helper Functions ==

fn client_cache(
    fetcher: Arc<CountingFetcher>,
    storage: Arc<dyn CacheStorage>,
    clock: &ManualClock,
) -> Arc<ClientQueryCache> {
    Arc::new(ClientQueryCache::with_clock(
        fetcher,
        storage,
        "u1",
        ClientCacheConfig::default(),
        Arc::new(clock.clone()),
    ))
}

fn page(n: u32) -> ListingQuery {
    ListingQuery::default().with_page(n)
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

// == Prefetch Tests ==

#[tokio::test]
async fn test_prefetch_fetches_next_two_pages() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    let stored = cache.prefetch_next_pages(&page(1), 500).await;
    assert_eq!(stored, 2);
    assert_eq!(fetcher.calls_for(2), 1);
    assert_eq!(fetcher.calls_for(3), 1);
    assert_eq!(fetcher.calls_for(4), 0);
    assert!(cache.contains_fresh(&page(3)).await);
}

#[tokio::test]
async fn test_concurrent_prefetch_fetches_each_page_once() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500).slow(Duration::from_millis(50)));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    let (page_a, page_b) = (page(1), page(1));
    let (first, second) = tokio::join!(
        cache.prefetch_next_pages(&page_a, 500),
        cache.prefetch_next_pages(&page_b, 500),
    );
    assert_eq!(first + second, 2);
    assert_eq!(fetcher.calls_for(2), 1);
    assert_eq!(fetcher.calls_for(3), 1);
    assert_eq!(cache.pending_prefetches(), 0);
}

#[tokio::test]
async fn test_prefetch_skips_cached_pages() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    cache.prefetch_next_pages(&page(1), 500).await;
    let stored = cache.prefetch_next_pages(&page(1), 500).await;
    assert_eq!(stored, 0);
    assert_eq!(fetcher.total_calls(), 2);
}

#[tokio::test]
async fn test_prefetch_respects_total_pages() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(25));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    // A single page of results leaves nothing to prefetch.
    assert_eq!(cache.prefetch_next_pages(&page(1), 25).await, 0);
    assert_eq!(fetcher.total_calls(), 0);
}

#[tokio::test]
async fn test_prefetch_failure_is_swallowed() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500).failing_on(2));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    let stored = cache.prefetch_next_pages(&page(1), 500).await;
    assert_eq!(stored, 1);
    assert!(!cache.contains_fresh(&page(2)).await);
    assert!(cache.contains_fresh(&page(3)).await);
    assert_eq!(cache.pending_prefetches(), 0);

    // The failed page is retried on the next sweep.
    cache.prefetch_next_pages(&page(1), 500).await;
    assert_eq!(fetcher.calls_for(2), 2);
}

#[tokio::test]
async fn test_load_page_serves_cache_and_prefetches() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500));
    let cache = client_cache(fetcher.clone(), Arc::new(MemoryStorage::new()), &clock);

    let response = cache.load_page(&page(1)).await.unwrap();
    assert_eq!(response.total_count, 500);
    wait_until(|| {
        let cache = cache.clone();
        async move { cache.contains_fresh(&page(3)).await }
    })
    .await;

    cache.load_page(&page(1)).await.unwrap();
    assert_eq!(fetcher.calls_for(1), 1, "second load is served from cache");
}

#[tokio::test]
async fn test_load_page_surfaces_primary_fetch_error() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500).failing_on(1));
    let cache = client_cache(fetcher, Arc::new(MemoryStorage::new()), &clock);

    let result = cache.load_page(&page(1)).await;
    assert!(matches!(result, Err(ClientError::Status(_))));
}

// == Persistence Tests ==

#[tokio::test]
async fn test_broken_storage_keeps_cache_working() {
    let clock = ManualClock::new(1_000_000);
    let fetcher = Arc::new(CountingFetcher::new(500));
    let cache = client_cache(fetcher, Arc::new(BrokenStorage), &clock);

    let response = cache.load_page(&page(1)).await.unwrap();
    cache.set(&page(1), response).await;
    assert!(cache.get(&page(1)).await.is_some());
    cache.clear_all().await;
    assert!(cache.get(&page(1)).await.is_none());
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = std::env::temp_dir().join(format!("dsa_tracker_client_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let clock = ManualClock::new(1_000_000);

    {
        let cache = client_cache(
            Arc::new(CountingFetcher::new(500)),
            Arc::new(FileStorage::new(&dir)),
            &clock,
        );
        for n in 1..=3 {
            let fetched = CountingFetcher::new(500).fetch(&page(n)).await.unwrap();
            cache.set(&page(n), fetched).await;
            clock.advance(Duration::from_millis(10));
        }
    }

    let fetcher = Arc::new(CountingFetcher::new(500));
    let reloaded = client_cache(fetcher.clone(), Arc::new(FileStorage::new(&dir)), &clock);
    assert_eq!(reloaded.stats().await.total_entries, 3);
    assert!(reloaded.get(&page(2)).await.is_some());
    assert_eq!(fetcher.total_calls(), 0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_rehydrated_entries_keep_eviction_order() {
    let clock = ManualClock::new(1_000_000);
    let storage = Arc::new(MemoryStorage::new());
    let config = ClientCacheConfig {
        max_entries: 3,
        ..ClientCacheConfig::default()
    };
    let make = |storage: Arc<MemoryStorage>| {
        ClientQueryCache::with_clock(
            Arc::new(CountingFetcher::new(500)),
            storage,
            "anonymous",
            config.clone(),
            Arc::new(clock.clone()),
        )
    };

    let response = CountingFetcher::new(500).fetch(&page(1)).await.unwrap();
    {
        let cache = make(storage.clone());
        for n in 1..=3 {
            cache.set(&page(n), response.clone()).await;
            clock.advance(Duration::from_millis(10));
        }
    }

    let reloaded = make(storage);
    reloaded.set(&page(4), response).await;
    assert!(reloaded.get(&page(1)).await.is_none());
    assert!(reloaded.get(&page(2)).await.is_some());
    assert!(reloaded.get(&page(4)).await.is_some());
}

// == HTTP Fetcher Tests ==

#[tokio::test]
async fn test_http_fetcher_against_live_server() {
    let repo = Arc::new(InMemoryRepository::new());
    for i in 0..60 {
        repo.create_question(QuestionInput {
            title: format!("Question {:03}", i),
            difficulty: Some(Difficulty::Easy),
            frequency: None,
            acceptance_rate: Some(50.0),
            link: None,
            topics: vec!["Array".to_string()],
            companies: vec![],
        })
        .await
        .unwrap();
    }
    let state = AppState::new(repo, &Config::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    let fetcher = Arc::new(HttpFetcher::new(format!("http://{}", addr)).with_user("u1"));
    let cache = Arc::new(ClientQueryCache::new(
        fetcher,
        Arc::new(MemoryStorage::new()),
        "u1",
        ClientCacheConfig::default(),
    ));

    let first = cache.load_page(&page(1)).await.unwrap();
    assert_eq!(first.total_count, 60);
    assert!(first.is_authenticated);
    assert_eq!(first.questions.len(), 25);

    wait_until(|| {
        let cache = cache.clone();
        async move { cache.contains_fresh(&page(3)).await }
    })
    .await;
    let third = cache.get(&page(3)).await.unwrap();
    assert_eq!(third.questions.len(), 10);

    let anonymous = HttpFetcher::new(format!("http://{}", addr));
    let query = ListingQuery {
        limit: 0,
        ..ListingQuery::default()
    };
    // limit=0 clamps to 1 on the server
    assert_eq!(anonymous.fetch(&query).await.unwrap().questions.len(), 1);

    server.abort();
}
