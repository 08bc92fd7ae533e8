//! Cache Store Module
//!
//! TTL store shared by the server and client caches: HashMap storage, lazy
//! expiry on read, an explicit sweep, and an optional size bound enforced by
//! evicting the oldest writes first.

use std::collections::HashMap;

use crate::cache::{CacheEntry, HitCounters, SharedClock, WriteOrder};

// == TTL Store ==
/// Keyed TTL store. All operations are infallible; a miss is just `None`.
#[derive(Debug)]
pub struct TtlStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Write order, oldest first
    order: WriteOrder,
    /// Hit/miss counters
    counters: HitCounters,
    /// Maximum number of entries, `None` for unbounded
    max_entries: Option<usize>,
    /// TTL applied when `set` is called without one
    default_ttl_ms: u64,
    clock: SharedClock,
}

impl<V> TtlStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `max_entries` - Size bound, `None` for unbounded
    /// * `default_ttl_ms` - TTL in milliseconds for writes without explicit TTL
    /// * `clock` - Time source for all expiry checks
    pub fn new(max_entries: Option<usize>, default_ttl_ms: u64, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            order: WriteOrder::new(),
            counters: HitCounters::new(),
            max_entries,
            default_ttl_ms,
            clock,
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    // == Set ==
    /// Stores a value with a fresh `created_at`, overwriting any previous entry.
    ///
    /// Returns the keys evicted to bring the store back within its bound.
    pub fn set(&mut self, key: String, value: V, ttl_ms: Option<u64>) -> Vec<String> {
        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);
        self.insert_entry(key, entry)
    }

    // == Insert Entry ==
    /// Stores a pre-built entry, keeping its original timestamp.
    ///
    /// Used when rehydrating persisted entries. Entries must be inserted in
    /// ascending `created_at` order for eviction to stay oldest-first.
    pub fn insert_entry(&mut self, key: String, entry: CacheEntry<V>) -> Vec<String> {
        self.order.record_write(&key);
        self.entries.insert(key, entry);
        debug_assert_eq!(self.order.len(), self.entries.len());
        self.enforce_bound()
    }

    fn enforce_bound(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();
        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                let Some(oldest) = self.order.pop_oldest() else {
                    break;
                };
                self.entries.remove(&oldest);
                self.counters.record_eviction();
                evicted.push(oldest);
            }
        }
        evicted
    }

    // == Get ==
    /// Returns the entry if present and fresh.
    ///
    /// An expired entry is removed on the spot and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<&CacheEntry<V>> {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(now),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove(key);
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        self.entries.get(key)
    }

    // == Contains Fresh ==
    /// Checks for a fresh entry without touching counters or evicting.
    pub fn contains_fresh(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    // == Remove ==
    /// Removes an entry; returns whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry. Returns the number removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }

        expired_keys.len()
    }

    // == Introspection ==
    /// All stored keys, expired or not.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> &HashMap<String, CacheEntry<V>> {
        &self.entries
    }

    /// Number of entries that are still fresh.
    pub fn fresh_len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }

    pub fn counters(&self) -> HitCounters {
        self.counters
    }

    // == Length ==
    /// Returns the current number of entries, including unswept expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use std::sync::Arc;
    use std::time::Duration;

    const FIVE_MINUTES_MS: u64 = 5 * 60 * 1000;

    fn store_with_clock(max_entries: Option<usize>) -> (TtlStore<String>, ManualClock) {
        let clock = ManualClock::new(1_000_000);
        let store = TtlStore::new(max_entries, FIVE_MINUTES_MS, Arc::new(clock.clone()));
        (store, clock)
    }

    #[test]
    fn test_store_new() {
        let (store, _) = store_with_clock(None);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store_with_clock(None);

        store.set("key1".to_string(), "value1".to_string(), None);
        let entry = store.get("key1").unwrap();

        assert_eq!(entry.value, "value1");
        assert_eq!(entry.ttl_ms, FIVE_MINUTES_MS);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store_with_clock(None);
        assert!(store.get("nonexistent").is_none());
        assert_eq!(store.counters().misses, 1);
    }

    #[test]
    fn test_store_overwrite_refreshes_timestamp() {
        let (mut store, clock) = store_with_clock(None);

        store.set("key1".to_string(), "value1".to_string(), None);
        clock.advance(Duration::from_secs(60));
        store.set("key1".to_string(), "value2".to_string(), None);

        let entry = store.get("key1").unwrap();
        assert_eq!(entry.value, "value2");
        assert_eq!(entry.created_at, 1_060_000);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ttl_boundary_one_millisecond_each_side() {
        let (mut store, clock) = store_with_clock(None);
        store.set("key1".to_string(), "value1".to_string(), None);

        clock.advance(Duration::from_millis(FIVE_MINUTES_MS - 1));
        assert!(store.get("key1").is_some());

        clock.advance(Duration::from_millis(2));
        assert!(store.get("key1").is_none());
        assert!(store.is_empty(), "Expired entry should be evicted on read");
    }

    #[test]
    fn test_explicit_ttl_overrides_default() {
        let (mut store, clock) = store_with_clock(None);
        store.set("short".to_string(), "v".to_string(), Some(1_000));
        store.set("long".to_string(), "v".to_string(), None);

        clock.advance(Duration::from_secs(2));
        assert!(store.get("short").is_none());
        assert!(store.get("long").is_some());
    }

    #[test]
    fn test_bounded_store_evicts_oldest_write() {
        let (mut store, clock) = store_with_clock(Some(50));

        for i in 0..50 {
            store.set(format!("key{}", i), format!("value{}", i), None);
            clock.advance(Duration::from_millis(1));
        }
        let evicted = store.set("key50".to_string(), "value50".to_string(), None);

        assert_eq!(store.len(), 50);
        assert_eq!(evicted, vec!["key0".to_string()]);
        assert!(store.get("key0").is_none());
        assert!(store.get("key50").is_some());
        assert_eq!(store.counters().evictions, 1);
    }

    #[test]
    fn test_rewrite_saves_key_from_eviction() {
        let (mut store, clock) = store_with_clock(Some(2));

        store.set("a".to_string(), "1".to_string(), None);
        clock.advance(Duration::from_millis(1));
        store.set("b".to_string(), "2".to_string(), None);
        clock.advance(Duration::from_millis(1));
        store.set("a".to_string(), "3".to_string(), None);
        clock.advance(Duration::from_millis(1));
        store.set("c".to_string(), "4".to_string(), None);

        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
        assert!(store.get("c").is_some());
    }

    #[test]
    fn test_reads_do_not_change_eviction_order() {
        let (mut store, _) = store_with_clock(Some(2));

        store.set("a".to_string(), "1".to_string(), None);
        store.set("b".to_string(), "2".to_string(), None);
        store.get("a");
        store.set("c".to_string(), "3".to_string(), None);

        assert!(!store.contains_fresh("a"));
        assert!(store.contains_fresh("b"));
    }

    #[test]
    fn test_unbounded_store_keeps_everything() {
        let (mut store, _) = store_with_clock(None);
        for i in 0..500 {
            store.set(format!("key{}", i), "v".to_string(), None);
        }
        assert_eq!(store.len(), 500);
    }

    #[test]
    fn test_clear() {
        let (mut store, _) = store_with_clock(None);
        store.set("a".to_string(), "1".to_string(), None);
        store.set("b".to_string(), "2".to_string(), None);

        assert_eq!(store.clear(), 2);
        assert!(store.get("a").is_none());
        assert!(store.get("b").is_none());
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (mut store, clock) = store_with_clock(None);

        store.set("key1".to_string(), "value1".to_string(), Some(1_000));
        store.set("key2".to_string(), "value2".to_string(), Some(10_000));

        clock.advance(Duration::from_millis(1_500));

        assert_eq!(store.len(), 2, "Expired entries linger until swept");
        assert_eq!(store.fresh_len(), 1);
        let removed = store.cleanup_expired();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
    }

    #[test]
    fn test_contains_fresh_leaves_counters_alone() {
        let (mut store, _) = store_with_clock(None);
        store.set("a".to_string(), "1".to_string(), None);

        assert!(store.contains_fresh("a"));
        assert!(!store.contains_fresh("b"));
        assert_eq!(store.counters(), HitCounters::new());
    }

    #[test]
    fn test_store_counters() {
        let (mut store, _) = store_with_clock(None);

        store.set("key1".to_string(), "value1".to_string(), None);
        store.get("key1");
        store.get("nonexistent");

        let counters = store.counters();
        assert_eq!(counters.hits, 1);
        assert_eq!(counters.misses, 1);
    }
}
