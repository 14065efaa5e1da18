//! In-memory key-value storage.

use crate::error::{AuthError, Result};
use crate::providers::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-process storage.
///
/// Clones share the same map, so one instance can back the credential store
/// and the push pipeline at once.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    /// Remove every entry, as when the user clears site data.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn clear_all(&self) -> Result<()> {
        self.entries.write().map_err(|_| poisoned())?.clear();
        Ok(())
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.entries.read().map_err(|_| poisoned())?.contains_key(key))
    }

    /// Number of stored entries.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(|_| poisoned())?.len())
    }

    /// Returns `true` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned() -> AuthError {
    AuthError::StorageError("storage lock poisoned".to_string())
}

impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().map_err(|_| poisoned())?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.set("k", "v1").await.unwrap();
        storage.set("k", "v2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some("v2".to_string()));

        storage.remove("k").await.unwrap();
        storage.remove("k").await.unwrap();
        assert!(storage.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let storage = MemoryStorage::with_entries([("a", "1")]);
        let other = storage.clone();
        other.set("b", "2").await.unwrap();

        assert_eq!(storage.len().unwrap(), 2);
        storage.clear_all().unwrap();
        assert!(!other.contains("a").unwrap());
    }
}
