//! Storage that always fails.

use crate::error::{AuthError, Result};
use crate::providers::KeyValueStore;
use std::future::Future;

/// Storage backend whose every operation fails with
/// [`AuthError::StorageError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStorage;

impl FailingStorage {
    fn error(operation: &str, key: &str) -> AuthError {
        AuthError::StorageError(format!("{operation} {key}: storage unavailable"))
    }
}

impl KeyValueStore for FailingStorage {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send {
        let error = Self::error("get", key);
        async move { Err(error) }
    }

    fn set(&self, key: &str, _value: &str) -> impl Future<Output = Result<()>> + Send {
        let error = Self::error("set", key);
        async move { Err(error) }
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send {
        let error = Self::error("remove", key);
        async move { Err(error) }
    }
}
