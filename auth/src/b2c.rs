//! Azure AD B2C authorization with PKCE.
//!
//! # Flow
//!
//! ```text
//! begin()                         complete(code)
//!   ├─ generate PKCE pair           ├─ take code_verifier from storage
//!   ├─ persist code_verifier        ├─ exchange code + verifier via backend
//!   └─ build authorize URL          └─ persist token + user
//! ```

use crate::config::B2cConfig;
use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::{AuthError, Result};
use crate::pkce::{PkcePair, CHALLENGE_METHOD};
use crate::providers::{KeyValueStore, TokenExchange};

/// A prepared authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Full authorize URL to navigate to.
    pub url: String,
    /// Nonce sent with the request.
    pub nonce: String,
    /// PKCE challenge sent with the request.
    pub code_challenge: String,
}

/// Drives the redirect and code exchange of a B2C login.
#[derive(Debug, Clone)]
pub struct B2cAuthorization<S, X> {
    config: B2cConfig,
    credentials: CredentialStore<S>,
    exchange: X,
}

impl<S, X> B2cAuthorization<S, X>
where
    S: KeyValueStore,
    X: TokenExchange,
{
    /// Create the flow.
    #[must_use]
    pub const fn new(config: B2cConfig, credentials: CredentialStore<S>, exchange: X) -> Self {
        Self {
            config,
            credentials,
            exchange,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &B2cConfig {
        &self.config
    }

    /// Prepare a redirect: generate and persist a PKCE verifier and build
    /// the authorize URL.
    ///
    /// # Errors
    ///
    /// Returns error if the verifier cannot be persisted or the query cannot
    /// be encoded.
    pub async fn begin(&self) -> Result<AuthorizationRequest> {
        let pair = PkcePair::generate();
        let nonce = uuid::Uuid::new_v4().simple().to_string();

        self.credentials.save_code_verifier(&pair.verifier).await?;

        let params = [
            ("p", self.config.policy.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("nonce", nonce.as_str()),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", self.config.scope.as_str()),
            ("response_type", "code"),
            ("prompt", self.config.prompt.as_str()),
            ("code_challenge", pair.challenge.as_str()),
            ("code_challenge_method", CHALLENGE_METHOD),
        ];

        let query = serde_urlencoded::to_string(&params[..])
            .map_err(|e| AuthError::ConfigError(format!("Failed to build authorize URL: {e}")))?;

        let separator = if self.config.authorize_url.contains('?') { '&' } else { '?' };
        let url = format!("{}{separator}{query}", self.config.authorize_url);

        tracing::info!(policy = %self.config.policy, "Authorization redirect prepared");

        Ok(AuthorizationRequest {
            url,
            nonce,
            code_challenge: pair.challenge,
        })
    }

    /// Finish the login with the `code` returned to the redirect URI.
    ///
    /// The stored verifier is consumed even if the exchange fails.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCodeVerifier`] if [`Self::begin`] did not run in
    ///   this storage context
    /// - [`AuthError::TokenExchangeFailed`] if the backend rejects the code
    /// - storage errors while persisting the result
    pub async fn complete(&self, code: &str) -> Result<StoredCredentials> {
        let verifier = self
            .credentials
            .take_code_verifier()
            .await?
            .ok_or(AuthError::MissingCodeVerifier)?;

        let response = self
            .exchange
            .exchange_code(code, &verifier, &self.config.redirect_uri)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Authorization code exchange failed"))?;

        self.credentials.save(&response.token, &response.user).await?;
        tracing::info!("Login completed");

        Ok(StoredCredentials {
            token: response.token,
            user: Some(response.user),
        })
    }
}
