use tracing::{debug, info};

use crate::cache::Cache;
use crate::error::Result;
use crate::storage::FileStorage;

/// Result of a PUT against the cached store, one variant per wire status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// Key was new; maps to `PUT_SUCCESS`.
    Inserted,
    /// Key existed and was overwritten; maps to `PUT_UPDATE`.
    Updated,
    /// Value was absent/empty, the key was removed; carries the deleted
    /// value for the `DELETE_SUCCESS` echo.
    Deleted(String),
}

/// Cache in front of persistent storage, write-through.
///
/// Storage is always ground truth: writes land in storage before the cache
/// is touched, so a cache entry implies an identical durable pair. Callers
/// serialize access through one lock; no locking happens here.
pub struct CachedStore {
    cache: Box<dyn Cache>,
    storage: FileStorage,
}

impl CachedStore {
    pub fn new(cache: Box<dyn Cache>, storage: FileStorage) -> Self {
        Self { cache, storage }
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    /// Check if the key is cached. No side effects.
    pub fn in_cache(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    /// Check if the key is durable. No side effects.
    pub fn in_storage(&self, key: &str) -> bool {
        self.storage.contains(key)
    }

    /// Look up a key, filling the cache from storage on a miss.
    pub fn get(&mut self, key: &str) -> Result<String> {
        if let Some(value) = self.cache.get(key) {
            debug!("cache hit: {}", key);
            return Ok(value);
        }

        let value = self.storage.get(key)?;
        debug!("cache miss, loaded from storage: {}", key);
        self.cache.put(key, &value);
        Ok(value)
    }

    /// Insert, update, or delete a key.
    ///
    /// An absent or empty value requests a delete. For an upsert, whether
    /// the key already existed is decided before the write so the outcome
    /// distinguishes insert from update.
    pub fn put(&mut self, key: &str, value: Option<&str>) -> Result<PutOutcome> {
        match value {
            Some(value) if !value.is_empty() => self.upsert(key, value),
            _ => self.delete(key).map(PutOutcome::Deleted),
        }
    }

    fn upsert(&mut self, key: &str, value: &str) -> Result<PutOutcome> {
        let existed = self.storage.contains(key);

        // Storage first: if this fails the cache is left untouched and
        // cannot run ahead of durable state
        self.storage.put(key, value)?;
        self.cache.put(key, value);

        Ok(if existed {
            PutOutcome::Updated
        } else {
            PutOutcome::Inserted
        })
    }

    /// Remove a key from storage and cache, returning the deleted value.
    pub fn delete(&mut self, key: &str) -> Result<String> {
        let old = self.storage.get(key)?;
        self.storage.delete(key)?;
        self.cache.delete(key);
        Ok(old)
    }

    pub fn clear_cache(&mut self) {
        info!("clearing cache");
        self.cache.clear();
    }

    /// Clears persistent entries only; the cache is not implicitly cleared.
    pub fn clear_storage(&mut self) -> Result<()> {
        self.storage.clear()
    }
}
