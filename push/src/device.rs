//! Stable per-profile device identifier.

use crate::error::Result;
use portal_auth::constants::storage_keys;
use portal_auth::KeyValueStore;
use serde::{Deserialize, Serialize};

/// Identifier of this browser profile, persisted under `fcmDeviceId`.
///
/// Generated once as a UUID v4 and reused until storage is cleared, so the
/// backend can tell a duplicate registration from a reinstall.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Return the persisted identifier, generating and persisting one first
    /// if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PushError::Storage`] if storage fails.
    pub async fn resolve<S: KeyValueStore>(storage: &S) -> Result<Self> {
        if let Some(existing) = storage.get(storage_keys::DEVICE_ID).await? {
            if !existing.trim().is_empty() {
                return Ok(Self(existing));
            }
        }

        let device_id = Self::generate();
        storage.set(storage_keys::DEVICE_ID, device_id.as_str()).await?;
        tracing::info!(device_id = %device_id, "Generated device id");
        Ok(device_id)
    }

    /// Borrow as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
