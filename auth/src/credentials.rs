//! Credential persistence.
//!
//! The credential store is a dumb durable cache. It keeps the bearer token
//! exactly as the backend returned it (plaintext JWT or encrypted) and never
//! checks expiry.

use crate::constants::storage_keys;
use crate::error::Result;
use crate::providers::KeyValueStore;
use serde_json::Value;

/// Token and user object as persisted after login.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredentials {
    /// Raw bearer token.
    pub token: String,
    /// User object, if one was stored.
    pub user: Option<Value>,
}

/// Reads and writes the `token`, `user` and `code_verifier` keys.
#[derive(Debug, Clone)]
pub struct CredentialStore<S> {
    storage: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    /// Wrap `storage`.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Persist a login result.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails or `user` cannot be serialized.
    pub async fn save(&self, token: &str, user: &Value) -> Result<()> {
        let user = serde_json::to_string(user)?;
        self.storage.set(storage_keys::TOKEN, token).await?;
        self.storage.set(storage_keys::USER, &user).await?;
        tracing::debug!("Credentials saved");
        Ok(())
    }

    /// Load the stored token and user.
    ///
    /// Returns `None` when no token is stored, whatever the user key holds.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails or the stored user is not JSON.
    pub async fn load(&self) -> Result<Option<StoredCredentials>> {
        let Some(token) = self.token().await? else {
            return Ok(None);
        };
        let user = self.user().await?;
        Ok(Some(StoredCredentials { token, user }))
    }

    /// Raw stored token.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub async fn token(&self) -> Result<Option<String>> {
        self.storage.get(storage_keys::TOKEN).await
    }

    /// Stored user object.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails or the stored value is not JSON.
    pub async fn user(&self) -> Result<Option<Value>> {
        self.storage
            .get(storage_keys::USER)
            .await?
            .map(|raw| serde_json::from_str::<Value>(&raw))
            .transpose()
            .map_err(Into::into)
    }

    /// Remove token, user and any pending code verifier.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub async fn clear(&self) -> Result<()> {
        for key in [storage_keys::TOKEN, storage_keys::USER, storage_keys::CODE_VERIFIER] {
            self.storage.remove(key).await?;
        }
        tracing::debug!("Credentials cleared");
        Ok(())
    }

    /// Persist the PKCE verifier before redirecting to the identity provider.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub async fn save_code_verifier(&self, verifier: &str) -> Result<()> {
        self.storage.set(storage_keys::CODE_VERIFIER, verifier).await
    }

    /// Read and delete the PKCE verifier.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub async fn take_code_verifier(&self) -> Result<Option<String>> {
        let verifier = self.storage.get(storage_keys::CODE_VERIFIER).await?;
        if verifier.is_some() {
            self.storage.remove(storage_keys::CODE_VERIFIER).await?;
        }
        Ok(verifier)
    }

    /// Remove cached lookup tables.
    ///
    /// # Errors
    ///
    /// Returns error if storage fails.
    pub async fn clear_lookup_cache<K: AsRef<str>>(&self, keys: &[K]) -> Result<()> {
        for key in keys {
            self.storage.remove(key.as_ref()).await?;
        }
        Ok(())
    }
}
