//! Durable key-value storage trait.

use crate::error::Result;

/// Durable string key-value storage.
///
/// Models origin-scoped client storage. Writes are last-write-wins per key;
/// there is no transaction spanning several keys.
///
/// # Implementation Notes
///
/// - Values are opaque strings; callers handle (de)serialization
/// - Removing a missing key is not an error
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::StorageError`] if the backend fails.
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::StorageError`] if the backend fails.
    fn set(&self, key: &str, value: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Delete a value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::StorageError`] if the backend fails.
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
