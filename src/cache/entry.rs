//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};

// == Cache Entry ==
/// A stored value together with the time it was written and how long it stays fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Freshness window in milliseconds
    pub ttl_ms: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry written at `now_ms`.
    pub fn new(value: V, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            ttl_ms,
        }
    }

    // == Age ==
    /// Milliseconds elapsed since the entry was written.
    ///
    /// A clock that reads earlier than `created_at` yields an age of zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: the entry is expired as soon as its age reaches the
    /// TTL, so an entry with `ttl_ms == 0` is never served.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.age_ms(now_ms) >= self.ttl_ms
    }

    // == Time To Live ==
    /// Returns remaining freshness in milliseconds, or 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.ttl_ms.saturating_sub(self.age_ms(now_ms))
    }

    /// Returns remaining freshness in whole seconds.
    pub fn ttl_remaining(&self, now_ms: u64) -> u64 {
        self.ttl_remaining_ms(now_ms) / 1000
    }
}
