//! Error types for authentication and token handling.

use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Error taxonomy for the client authentication core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Token Errors
    // ═══════════════════════════════════════════════════════════

    /// Encrypted token does not have exactly three `:`-separated segments.
    #[error("Invalid encrypted token format: expected 3 segments, found {segments}")]
    InvalidFormat {
        /// Number of segments found
        segments: usize,
    },

    /// Token could not be decrypted (bad encoding, IV/tag length, tag mismatch, invalid UTF-8).
    #[error("Token decryption failed: {0}")]
    DecryptionFailed(String),

    /// The shared token secret is not configured.
    #[error("Token secret is not configured")]
    MissingSecret,

    /// Decrypted token is not a structurally valid JWT.
    #[error("Malformed JWT: {0}")]
    MalformedJwt(String),

    // ═══════════════════════════════════════════════════════════
    // Authorization Flow Errors
    // ═══════════════════════════════════════════════════════════

    /// No PKCE code verifier was persisted before the redirect.
    #[error("No PKCE code verifier found for this authorization")]
    MissingCodeVerifier,

    /// The backend rejected or failed the authorization code exchange.
    #[error("Code exchange failed: {0}")]
    TokenExchangeFailed(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Stored value could not be (de)serialized.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AuthError {
    /// Returns `true` if this error means the stored session cannot be used
    /// and the user should re-authenticate.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_auth::AuthError;
    /// assert!(AuthError::DecryptionFailed("tag mismatch".into()).is_session_error());
    /// assert!(!AuthError::MissingSecret.is_session_error());
    /// ```
    pub const fn is_session_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat { .. } | Self::DecryptionFailed(_) | Self::MalformedJwt(_)
        )
    }

    /// Returns `true` if this error indicates a deployment defect.
    ///
    /// # Examples
    ///
    /// ```
    /// # use portal_auth::AuthError;
    /// assert!(AuthError::MissingSecret.is_configuration_error());
    /// assert!(!AuthError::MissingCodeVerifier.is_configuration_error());
    /// ```
    pub const fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingSecret | Self::ConfigError(_))
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::SerializationError(error.to_string())
    }
}
