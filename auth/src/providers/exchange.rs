//! Authorization code exchange trait.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Result of a successful code exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeResponse {
    /// Bearer token, plaintext JWT or encrypted.
    pub token: String,

    /// User object as returned by the backend.
    #[serde(default)]
    pub user: serde_json::Value,
}

/// Backend that trades an authorization code and PKCE verifier for a
/// session token.
pub trait TokenExchange: Send + Sync {
    /// Exchange `code` for a token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::TokenExchangeFailed`] if the backend is
    /// unreachable or rejects the code.
    fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> impl std::future::Future<Output = Result<ExchangeResponse>> + Send;
}
