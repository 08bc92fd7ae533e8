//! Write Order Module
//!
//! Tracks the order in which keys were last written, for oldest-first eviction.

use std::collections::VecDeque;

// == Write Order ==
/// Keys ordered by their most recent write.
///
/// - Front = oldest write
/// - Back = newest write
///
/// Reads never reorder keys: an entry's age is measured from its last write,
/// so the front of the queue always holds the entry with the oldest `created_at`.
#[derive(Debug, Default, Clone)]
pub struct WriteOrder {
    order: VecDeque<String>,
}

impl WriteOrder {
    // == Constructor ==
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record Write ==
    /// Marks a key as the newest write, moving it to the back if already present.
    pub fn record_write(&mut self, key: &str) {
        self.remove(key);
        self.order.push_back(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest written key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_new() {
        let order = WriteOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
    }

    #[test]
    fn test_first_write_is_oldest() {
        let mut order = WriteOrder::new();

        order.record_write("key1");
        order.record_write("key2");
        order.record_write("key3");

        assert_eq!(order.len(), 3);
        assert_eq!(order.pop_oldest(), Some("key1".to_string()));
    }

    #[test]
    fn test_rewrite_moves_key_to_newest() {
        let mut order = WriteOrder::new();

        order.record_write("a");
        order.record_write("b");
        order.record_write("c");
        order.record_write("a");

        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.pop_oldest(), Some("c".to_string()));
        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_remove() {
        let mut order = WriteOrder::new();

        order.record_write("key1");
        order.record_write("key2");
        order.remove("key1");
        order.remove("nonexistent");

        assert_eq!(order.len(), 1);
        assert_eq!(order.pop_oldest(), Some("key2".to_string()));
    }

    #[test]
    fn test_same_key_written_repeatedly() {
        let mut order = WriteOrder::new();

        order.record_write("key1");
        order.record_write("key1");
        order.record_write("key1");

        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut order = WriteOrder::new();
        order.record_write("key1");
        order.clear();
        assert!(order.is_empty());
    }
}
