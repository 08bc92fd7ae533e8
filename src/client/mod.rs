//! Client-side query cache
//!
//! What a browsing session keeps between navigations: a bounded, persisted
//! page cache in front of the listing endpoint, with speculative prefetch.

mod cache;
mod fetcher;
mod storage;

pub use cache::{CachedPage, ClientCacheConfig, ClientCacheStats, ClientQueryCache};
pub use fetcher::{ClientError, HttpFetcher, QuestionsFetcher};
pub use storage::{CacheStorage, FileStorage, MemoryStorage, StorageError};
