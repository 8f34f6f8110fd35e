use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Durable key-value store, one file per key under a root directory.
///
/// Filenames are the MD5 hex digest of the key rather than the raw key, so
/// keys containing path separators or filesystem-reserved names cannot
/// escape the root or collide with each other.
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens the store, creating the root directory if needed.
    ///
    /// Failure here means the server cannot persist anything and must
    /// refuse to start.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        debug!("opened file storage at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{:x}", md5::compute(key.as_bytes())))
    }

    /// Check if the key is in storage. No side effects.
    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    pub fn get(&self, key: &str) -> Result<String> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Create or overwrite the value file for the key.
    ///
    /// Truncate-and-write: the data is on disk before this returns, but a
    /// crash mid-write can leave a partial file. Concurrent readers are
    /// protected by the store-level lock, not by this method.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Err(Error::KeyNotFound(key.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    /// Remove every persisted entry.
    pub fn clear(&self) -> Result<()> {
        warn!("clearing persistent storage at {}", self.root.display());
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (FileStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        (storage, dir)
    }

    #[test]
    fn put_then_get_returns_value() {
        let (storage, _dir) = storage();
        storage.put("foo", "bar").unwrap();
        assert!(storage.contains("foo"));
        assert_eq!(storage.get("foo").unwrap(), "bar");
    }

    #[test]
    fn get_absent_key_fails_not_found() {
        let (storage, _dir) = storage();
        assert!(matches!(
            storage.get("missing"),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn put_overwrites_prior_content_completely() {
        let (storage, _dir) = storage();
        storage.put("foo", "a much longer original value").unwrap();
        storage.put("foo", "x").unwrap();
        assert_eq!(storage.get("foo").unwrap(), "x");
    }

    #[test]
    fn delete_removes_the_entry() {
        let (storage, _dir) = storage();
        storage.put("foo", "bar").unwrap();
        storage.delete("foo").unwrap();
        assert!(!storage.contains("foo"));
        assert!(matches!(storage.get("foo"), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn delete_absent_key_fails_not_found() {
        let (storage, _dir) = storage();
        assert!(matches!(
            storage.delete("missing"),
            Err(Error::KeyNotFound(_))
        ));
    }

    #[test]
    fn filesystem_unsafe_keys_are_stored_safely() {
        let (storage, dir) = storage();
        let keys = ["a/b/c", "..", ".", "CON", "key with spaces", "tab\tkey"];
        for (i, key) in keys.iter().enumerate() {
            storage.put(key, &format!("value{}", i)).unwrap();
        }
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(storage.get(key).unwrap(), format!("value{}", i));
        }
        // Nothing escaped the root directory
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, keys.len());
    }

    #[test]
    fn distinct_keys_map_to_distinct_files() {
        let (storage, _dir) = storage();
        storage.put("key1", "one").unwrap();
        storage.put("key2", "two").unwrap();
        assert_eq!(storage.get("key1").unwrap(), "one");
        assert_eq!(storage.get("key2").unwrap(), "two");
    }

    #[test]
    fn clear_removes_all_entries() {
        let (storage, _dir) = storage();
        storage.put("a", "1").unwrap();
        storage.put("b", "2").unwrap();
        storage.clear().unwrap();
        assert!(!storage.contains("a"));
        assert!(!storage.contains("b"));
        // Clear on an empty store is fine
        storage.clear().unwrap();
    }

    #[test]
    fn values_survive_reopening_the_store() {
        let dir = TempDir::new().unwrap();
        {
            let storage = FileStorage::new(dir.path()).unwrap();
            storage.put("foo", "bar").unwrap();
        }
        let storage = FileStorage::new(dir.path()).unwrap();
        assert_eq!(storage.get("foo").unwrap(), "bar");
    }
}
