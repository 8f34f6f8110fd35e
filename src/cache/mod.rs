//! Bounded in-memory caches with pluggable eviction.
//!
//! One implementation per replacement policy, all behind the [`Cache`]
//! trait. The policy is chosen once at server construction and never
//! changes for the lifetime of the server.

mod fifo;
mod lfu;
mod lru;

pub use fifo::FifoCache;
pub use lfu::LfuCache;
pub use lru::LruCache;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Cache replacement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Strategy {
    Fifo,
    Lru,
    Lfu,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fifo => "FIFO",
            Strategy::Lru => "LRU",
            Strategy::Lfu => "LFU",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FIFO" => Ok(Strategy::Fifo),
            "LRU" => Ok(Strategy::Lru),
            "LFU" => Ok(Strategy::Lfu),
            _ => Err(Error::Config(format!(
                "invalid cache strategy '{}' (expected FIFO, LRU, or LFU)",
                s
            ))),
        }
    }
}

/// Bounded key-value cache.
///
/// `contains` has no side effects; `get` and `put` update the policy
/// metadata (access order, access counts) as each implementation requires.
/// `put` of a new key evicts when the cache is at capacity; updating an
/// existing key never evicts.
pub trait Cache: Send {
    fn capacity(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> bool;

    fn get(&mut self, key: &str) -> Option<String>;

    fn put(&mut self, key: &str, value: &str);

    /// Removes the key and its metadata; absent keys are a no-op.
    fn delete(&mut self, key: &str);

    fn clear(&mut self);
}

/// Construct the cache implementation for the given strategy.
pub fn new_cache(strategy: Strategy, capacity: usize) -> Box<dyn Cache> {
    match strategy {
        Strategy::Fifo => Box::new(FifoCache::new(capacity)),
        Strategy::Lru => Box::new(LruCache::new(capacity)),
        Strategy::Lfu => Box::new(LfuCache::new(capacity)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("FIFO".parse::<Strategy>().unwrap(), Strategy::Fifo);
        assert_eq!("lru".parse::<Strategy>().unwrap(), Strategy::Lru);
        assert_eq!("Lfu".parse::<Strategy>().unwrap(), Strategy::Lfu);
        assert!("NONE".parse::<Strategy>().is_err());
    }

    #[test]
    fn strategy_display_matches_wire_spelling() {
        assert_eq!(Strategy::Fifo.to_string(), "FIFO");
        assert_eq!(Strategy::Lru.to_string(), "LRU");
        assert_eq!(Strategy::Lfu.to_string(), "LFU");
    }

    #[test]
    fn capacity_bound_holds_for_every_strategy() {
        for strategy in [Strategy::Fifo, Strategy::Lru, Strategy::Lfu] {
            let mut cache = new_cache(strategy, 3);
            for i in 0..10 {
                cache.put(&format!("key{}", i), "value");
                assert!(cache.len() <= 3, "{} exceeded capacity", strategy);
            }
            assert_eq!(cache.len(), 3);
        }
    }

    #[test]
    fn update_never_evicts_for_any_strategy() {
        for strategy in [Strategy::Fifo, Strategy::Lru, Strategy::Lfu] {
            let mut cache = new_cache(strategy, 2);
            cache.put("a", "1");
            cache.put("b", "2");
            cache.put("a", "3");
            assert_eq!(cache.len(), 2);
            assert!(cache.contains("a"));
            assert!(cache.contains("b"));
            assert_eq!(cache.get("a").as_deref(), Some("3"));
        }
    }

    #[test]
    fn delete_absent_key_is_noop() {
        for strategy in [Strategy::Fifo, Strategy::Lru, Strategy::Lfu] {
            let mut cache = new_cache(strategy, 2);
            cache.put("a", "1");
            cache.delete("missing");
            assert_eq!(cache.len(), 1);
            assert!(cache.contains("a"));
        }
    }

    #[test]
    fn clear_empties_every_strategy() {
        for strategy in [Strategy::Fifo, Strategy::Lru, Strategy::Lfu] {
            let mut cache = new_cache(strategy, 4);
            cache.put("a", "1");
            cache.put("b", "2");
            cache.clear();
            assert!(cache.is_empty());
            assert!(!cache.contains("a"));
            // Cache stays usable after clear
            cache.put("c", "3");
            assert_eq!(cache.get("c").as_deref(), Some("3"));
        }
    }
}
