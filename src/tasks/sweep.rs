//! Cache Sweep Task
//!
//! Background task that periodically removes expired server cache entries.
//! Reads already skip expired entries; the sweep only bounds memory held by
//! keys nobody asks for again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ServerQueryCache;

/// Spawns a background task that sweeps `cache` every `interval`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = ServerQueryCache::new(Duration::from_secs(300));
/// let sweep_handle = spawn_sweep_task(cache.clone(), Duration::from_secs(300));
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: ServerQueryCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cache::{CachedValue, ManualClock};
    use crate::models::FilterOptions;

    fn filters() -> CachedValue {
        CachedValue::Filters(Arc::new(FilterOptions::default()))
    }

    #[tokio::test]
    async fn test_sweep_removes_expired_entries() {
        let clock = ManualClock::new(1_000);
        let cache = ServerQueryCache::with_clock(Duration::from_secs(300), Arc::new(clock.clone()));
        cache.set("expire_soon", filters(), Some(Duration::from_secs(1))).await;
        cache.set("long_lived", filters(), None).await;

        clock.advance(Duration::from_secs(2));
        let handle = spawn_sweep_task(cache.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;

        // The sweep leaves unexpired entries alone.
        assert_eq!(cache.stats().await.keys, vec!["long_lived".to_string()]);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_task_can_be_aborted() {
        let cache = ServerQueryCache::new(Duration::from_secs(300));

        let handle = spawn_sweep_task(cache, Duration::from_secs(1));

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
