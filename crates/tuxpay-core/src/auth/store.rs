//! Key-value slots that hold the bearer token between runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

/// A single key-value persistence slot.
///
/// Durable stores survive restarts; ephemeral stores last as long as the
/// session that created them.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Durable store: one file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl TokenStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read token file: {}", path.display()))?;
        let trimmed = contents.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create token directory: {}", self.dir.display()))?;
        let path = self.path(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write token file: {}", path.display()))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove token file: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Ephemeral store held in memory.
///
/// Clones share the same slots, so two handles behave like two views of the
/// same browser tab's session storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_slots<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> Result<T> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory token store lock poisoned"))?;
        Ok(f(&mut slots))
    }
}

impl TokenStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_slots(|slots| slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.with_slots(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.with_slots(|slots| {
            slots.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("token").unwrap(), None);
        store.set("token", "abc.def.ghi").unwrap();
        assert_eq!(store.get("token").unwrap().as_deref(), Some("abc.def.ghi"));

        // A second handle on the same directory sees the same value
        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc.def.ghi"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
        store.remove("token").unwrap(); // idempotent
    }

    #[test]
    fn test_memory_store_clones_share_slots() {
        let store = MemoryStore::new();
        let view = store.clone();

        store.set("token", "value").unwrap();
        assert_eq!(view.get("token").unwrap().as_deref(), Some("value"));

        view.remove("token").unwrap();
        assert_eq!(store.get("token").unwrap(), None);
    }
}
