//! Session decoding.
//!
//! Turns the stored bearer token into identity claims:
//!
//! ```text
//! load token → strip "Bearer " → decrypt if it contains ':' → decode JWT payload
//! ```
//!
//! A missing, undecryptable or malformed token is a normal outcome for the
//! portal (the user is sent back to login), so those are reported as
//! [`SessionResolution`] variants. The only error surfaced is
//! [`AuthError::MissingSecret`], which means the deployment is broken.

use crate::cipher::{is_encrypted, TokenCipher};
use crate::claims::Claims;
use crate::config::AuthConfig;
use crate::credentials::CredentialStore;
use crate::error::{AuthError, Result};
use crate::providers::KeyValueStore;
use crate::utils::strip_bearer;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Outcome of decoding the stored session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionResolution {
    /// No token is stored.
    Absent,
    /// A token is stored but cannot be decrypted or decoded.
    Invalid(AuthError),
    /// The token decoded into claims.
    Valid(Claims),
}

impl SessionResolution {
    /// Returns `true` for [`SessionResolution::Valid`].
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Claims of a valid session.
    #[must_use]
    pub const fn claims(&self) -> Option<&Claims> {
        match self {
            Self::Valid(claims) => Some(claims),
            Self::Absent | Self::Invalid(_) => None,
        }
    }

    /// Consume into the claims of a valid session.
    #[must_use]
    pub fn into_claims(self) -> Option<Claims> {
        match self {
            Self::Valid(claims) => Some(claims),
            Self::Absent | Self::Invalid(_) => None,
        }
    }
}

/// A token that decoded successfully, with the JWT it decoded from.
struct DecodedToken {
    jwt: String,
    claims: Claims,
}

enum Decoded {
    Absent,
    Invalid(AuthError),
    Valid(DecodedToken),
}

/// Decodes the stored session on demand.
///
/// The token key is derived on first use of an encrypted token and reused
/// by every clone of the decoder.
#[derive(Debug, Clone)]
pub struct SessionDecoder<S> {
    credentials: CredentialStore<S>,
    config: AuthConfig,
    cipher: Arc<OnceCell<TokenCipher>>,
}

impl<S: KeyValueStore> SessionDecoder<S> {
    /// Create a decoder over `credentials`.
    #[must_use]
    pub fn new(credentials: CredentialStore<S>, config: AuthConfig) -> Self {
        Self {
            credentials,
            config,
            cipher: Arc::new(OnceCell::new()),
        }
    }

    /// Credential store this decoder reads from.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore<S> {
        &self.credentials
    }

    /// Resolve the current identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] if the stored token is encrypted
    /// and no secret is configured. Every other failure is reported as
    /// [`SessionResolution::Invalid`].
    pub async fn resolve_identity(&self) -> Result<SessionResolution> {
        Ok(match self.decode().await? {
            Decoded::Absent => SessionResolution::Absent,
            Decoded::Invalid(reason) => SessionResolution::Invalid(reason),
            Decoded::Valid(token) => SessionResolution::Valid(token.claims),
        })
    }

    /// Claims of the current session, `None` unless it is valid.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] as [`Self::resolve_identity`] does.
    pub async fn claims(&self) -> Result<Option<Claims>> {
        Ok(self.resolve_identity().await?.into_claims())
    }

    /// Decrypted JWT for an `Authorization: Bearer` header.
    ///
    /// Returns `None` unless the stored session is valid.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] as [`Self::resolve_identity`] does.
    pub async fn bearer_token(&self) -> Result<Option<String>> {
        Ok(match self.decode().await? {
            Decoded::Valid(token) => Some(token.jwt),
            Decoded::Absent | Decoded::Invalid(_) => None,
        })
    }

    async fn decode(&self) -> Result<Decoded> {
        let raw = match self.credentials.token().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Decoded::Absent),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored token");
                return Ok(Decoded::Invalid(e));
            },
        };

        let token = strip_bearer(&raw);
        if token.is_empty() {
            return Ok(Decoded::Absent);
        }

        let jwt = if is_encrypted(token) {
            let cipher = self.cipher().await?;
            match cipher.decrypt(token) {
                Ok(jwt) => jwt,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored token could not be decrypted");
                    return Ok(Decoded::Invalid(e));
                },
            }
        } else {
            token.to_string()
        };

        match Claims::from_jwt(&jwt) {
            Ok(claims) => Ok(Decoded::Valid(DecodedToken { jwt, claims })),
            Err(e) => {
                tracing::warn!(error = %e, "Stored token is not a valid JWT");
                Ok(Decoded::Invalid(e))
            },
        }
    }

    async fn cipher(&self) -> Result<&TokenCipher> {
        self.cipher
            .get_or_try_init(|| async {
                if !self.config.has_secret() {
                    tracing::error!("Encrypted token found but no token secret is configured");
                    return Err(AuthError::MissingSecret);
                }

                let secret = self.config.token_secret.clone();
                tokio::task::spawn_blocking(move || TokenCipher::new(&secret))
                    .await
                    .map_err(|e| AuthError::DecryptionFailed(format!("key derivation task failed: {e}")))?
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::stores::MemoryStorage;
    use portal_testing::fixtures::{encrypt_token, unsigned_jwt};
    use serde_json::json;

    const SECRET: &str = "session-secret";

    fn decoder_with(token: Option<&str>, secret: &str) -> SessionDecoder<MemoryStorage> {
        let storage = token.map_or_else(MemoryStorage::new, |token| {
            MemoryStorage::with_entries([("token", token)])
        });
        SessionDecoder::new(CredentialStore::new(storage), AuthConfig::new(secret.to_string()))
    }

    #[tokio::test]
    async fn test_plaintext_jwt_with_bearer_prefix() {
        let jwt = unsigned_jwt(&json!({ "sub": "u1" }));
        let decoder = decoder_with(Some(&format!("Bearer {jwt}")), "");

        let resolution = decoder.resolve_identity().await.unwrap();
        assert_eq!(resolution.claims().unwrap().subject(), Some("u1"));
        assert_eq!(decoder.bearer_token().await.unwrap(), Some(jwt));
    }

    #[tokio::test]
    async fn test_encrypted_without_secret_is_error() {
        let token = encrypt_token("a.b.c", SECRET);
        let decoder = decoder_with(Some(&token), "");
        assert_eq!(decoder.resolve_identity().await, Err(AuthError::MissingSecret));
    }

    #[tokio::test]
    async fn test_blank_token_is_absent() {
        let decoder = decoder_with(Some("Bearer  "), SECRET);
        assert_eq!(decoder.resolve_identity().await.unwrap(), SessionResolution::Absent);
    }
}
