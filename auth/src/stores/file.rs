//! File-backed key-value storage.
//!
//! # Format
//!
//! One JSON object of string values:
//!
//! ```json
//! { "token": "...", "fcmDeviceId": "..." }
//! ```
//!
//! Every write rewrites the whole document through a temporary file and a
//! rename. Writers in this process are serialized; concurrent processes are
//! last-write-wins.

use crate::error::{AuthError, Result};
use crate::providers::KeyValueStore;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

type Document = BTreeMap<String, String>;

/// Storage persisted to a JSON file.
///
/// # Example
///
/// ```no_run
/// use portal_auth::stores::FileStorage;
///
/// let storage = FileStorage::new("/var/lib/portal/storage.json");
/// ```
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileStorage {
    /// Use the document at `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AuthError::StorageError(format!(
                    "corrupt storage document {}: {e}",
                    self.path.display()
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::new()),
            Err(e) => Err(io_error("read", &self.path, &e)),
        }
    }

    async fn write_document(&self, document: &Document) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory for", &self.path, &e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error("write", &tmp, &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error("replace", &self.path, &e))
    }

    async fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut Document) -> bool + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        if mutate(&mut document) {
            self.write_document(&document).await?;
        }
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, error: &std::io::Error) -> AuthError {
    AuthError::StorageError(format!("failed to {action} {}: {error}", path.display()))
}

impl KeyValueStore for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.update(move |document| {
            document.insert(key, value);
            true
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(|document| document.remove(key).is_some()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        assert_eq!(storage.get("token").await.unwrap(), None);
        storage.remove("token").await.unwrap();
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        storage.set("token", "abc").await.unwrap();
        storage.set("fcmDeviceId", "dev-1").await.unwrap();
        storage.remove("token").await.unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("token").await.unwrap(), None);
        assert_eq!(reopened.get("fcmDeviceId").await.unwrap(), Some("dev-1".to_string()));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(
            storage.get("token").await,
            Err(AuthError::StorageError(_))
        ));
    }
}
