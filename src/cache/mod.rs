//! Cache Module
//!
//! Key derivation, the generic TTL store, and the process-wide server cache.

mod clock;
mod entry;
pub mod key;
mod order;
mod server;
mod stats;
mod store;


// Re-export public types
pub use clock::{current_timestamp_ms, system_clock, Clock, ManualClock, SharedClock, SystemClock};
pub use entry::CacheEntry;
pub use key::{encode_listing, ANONYMOUS, FILTERS_KEY, LISTING_NAMESPACE};
pub use order::WriteOrder;
pub use server::{CacheHit, CachedValue, ServerQueryCache};
pub use stats::{CacheStats, HitCounters};
pub use store::TtlStore;
