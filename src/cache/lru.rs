use std::collections::HashMap;

use tracing::debug;

use super::Cache;

/// Least-recently-used cache.
///
/// Every `get` and every `put` (updates included) stamps the key with a
/// logical tick from a monotonic counter. The counter stands in for a
/// wall-clock timestamp: same ordering, but ties are impossible, so
/// eviction is deterministic.
pub struct LruCache {
    capacity: usize,
    entries: HashMap<String, String>,
    last_used: HashMap<String, u64>,
    tick: u64,
}

impl LruCache {
    pub fn new(capacity: usize) -> Self {
        debug!("initializing LRU cache with {} entries", capacity);
        Self {
            capacity,
            entries: HashMap::new(),
            last_used: HashMap::new(),
            tick: 0,
        }
    }

    fn touch(&mut self, key: &str) {
        self.tick += 1;
        self.last_used.insert(key.to_string(), self.tick);
    }

    fn least_recent_key(&self) -> Option<String> {
        self.last_used
            .iter()
            .min_by_key(|(_, tick)| **tick)
            .map(|(key, _)| key.clone())
    }
}

impl Cache for LruCache {
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
        let value = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    fn put(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = value.to_string();
            self.touch(key);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.least_recent_key() {
                debug!("evicting {} from cache", evicted);
                self.entries.remove(&evicted);
                self.last_used.remove(&evicted);
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.touch(key);
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
        self.last_used.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.last_used.clear();
    }
}
