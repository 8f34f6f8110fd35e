use std::collections::HashMap;

use tracing::debug;

use super::Cache;

/// Least-frequently-used cache.
///
/// Each entry carries an access count, initialized to 1 on insert and
/// incremented on every `get` and every update-`put`. Count ties are broken
/// by the smaller insertion sequence number, so eviction is deterministic.
pub struct LfuCache {
    capacity: usize,
    entries: HashMap<String, String>,
    usage: HashMap<String, Usage>,
    next_seq: u64,
}

#[derive(Clone, Copy)]
struct Usage {
    count: u64,
    seq: u64,
}

impl LfuCache {
    pub fn new(capacity: usize) -> Self {
        debug!("initializing LFU cache with {} entries", capacity);
        Self {
            capacity,
            entries: HashMap::new(),
            usage: HashMap::new(),
            next_seq: 0,
        }
    }

    fn bump(&mut self, key: &str) {
        if let Some(usage) = self.usage.get_mut(key) {
            usage.count += 1;
        }
    }

    fn least_frequent_key(&self) -> Option<String> {
        self.usage
            .iter()
            .min_by_key(|(_, usage)| (usage.count, usage.seq))
            .map(|(key, _)| key.clone())
    }
}

impl Cache for LfuCache {
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
        self.bump(key);
        Some(value)
    }

    fn put(&mut self, key: &str, value: &str) {
        if let Some(entry) = self.entries.get_mut(key) {
            *entry = value.to_string();
            self.bump(key);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.least_frequent_key() {
                debug!("evicting {} from cache", evicted);
                self.entries.remove(&evicted);
                self.usage.remove(&evicted);
            }
        }

        self.entries.insert(key.to_string(), value.to_string());
        self.usage.insert(
            key.to_string(),
            Usage {
                count: 1,
                seq: self.next_seq,
            },
        );
        self.next_seq += 1;
    }

    fn delete(&mut self, key: &str) {
        self.entries.remove(key);
        self.usage.remove(key);
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.usage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_least_frequently_accessed() {
        let mut cache = LfuCache::new(2);
        cache.put("k1", "v1");
        cache.put("k2", "v2");
        cache.get("k1");
        cache.get("k1");
        cache.put("k3", "v3");

        // k2 has one access, k1 has three
        assert!(cache.contains("k1"));
        assert!(!cache.contains("k2"));
        assert!(cache.contains("k3"));
    }

    #[test]
    fn count_ties_break_by_insertion_order() {
        let mut cache = LfuCache::new(2);
        cache.put("k1", "v1");
        cache.put("k2", "v2");
        // Both have count 1; k1 was inserted first
        cache.put("k3", "v3");

        assert!(!cache.contains("k1"));
        assert!(cache.contains("k2"));
        assert!(cache.contains("k3"));
    }

    #[test]
    fn update_counts_as_access() {
        let mut cache = LfuCache::new(2);
        cache.put("k1", "v1");
        cache.put("k2", "v2");
        cache.put("k1", "updated");
        cache.put("k3", "v3");

        // k1 is at count 2 after the update, k2 still at 1
        assert!(cache.contains("k1"));
        assert!(!cache.contains("k2"));
    }

    #[test]
    fn fresh_insert_starts_at_count_one() {
        let mut cache = LfuCache::new(2);
        cache.put("k1", "v1");
        cache.get("k1");
        cache.put("k2", "v2");
        cache.put("k3", "v3");

        // k2 (count 1) loses to k1 (count 2)
        assert!(cache.contains("k1"));
        assert!(!cache.contains("k2"));
        assert!(cache.contains("k3"));
    }

    #[test]
    fn deleted_key_reinserts_with_reset_count() {
        let mut cache = LfuCache::new(2);
        cache.put("k1", "v1");
        cache.get("k1");
        cache.get("k1");
        cache.delete("k1");
        cache.put("k1", "again");
        cache.put("k2", "v2");
        cache.put("k3", "v3");

        // Reinserted k1 is back at count 1 and older than k2, so it goes
        assert!(!cache.contains("k1"));
        assert!(cache.contains("k2"));
        assert!(cache.contains("k3"));
    }
}
