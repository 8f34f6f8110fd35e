use std::collections::{HashMap, VecDeque};

use tracing::debug;

use super::Cache;

/// First-in-first-out cache.
///
/// Eviction follows insertion order only; neither `get` nor an update-`put`
/// changes a key's position in the queue.
pub struct FifoCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

impl FifoCache {
    pub fn new(capacity: usize) -> Self {
        debug!("initializing FIFO cache with {} entries", capacity);
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }
}

impl Cache for FifoCache {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn get(&mut self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        // Updating in place keeps the original insertion position
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = value.to_string();
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                debug!("evicting {} from cache", evicted);
                self.entries.remove(&evicted);
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.order.push_back(key.to_string());
    }

    fn delete(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|k| k != key);
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}
