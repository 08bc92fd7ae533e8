//! Cache Statistics Module
//!
//! Hit/miss counters kept by every store, and the `{size, keys}` snapshot the
//! admin tooling reads.

use serde::Serialize;

// == Hit Counters ==
/// Running hit/miss/eviction counters for a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitCounters {
    /// Lookups that returned a fresh value
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed to respect a size bound
    pub evictions: u64,
}

impl HitCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Introspection snapshot of the server cache.
///
/// `keys` may include entries that are expired but not yet swept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Builds a snapshot from a key list and the store's counters.
    pub fn new(mut keys: Vec<String>, counters: HitCounters) -> Self {
        keys.sort();
        Self {
            size: keys.len(),
            keys,
            hits: counters.hits,
            misses: counters.misses,
        }
    }
}
