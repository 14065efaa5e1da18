//! HTTP code exchange against the portal backend.

use crate::config::B2cConfig;
use crate::error::{AuthError, Result};
use crate::providers::{ExchangeResponse, TokenExchange};
use reqwest::Client;
use serde::Serialize;

/// Posts the authorization code to the portal backend.
///
/// Request body:
///
/// ```json
/// { "code": "...", "codeVerifier": "...", "redirectUri": "..." }
/// ```
///
/// A 2xx response must carry `{ "token": "...", "user": { ... } }`.
///
/// # Example
///
/// ```no_run
/// use portal_auth::providers::HttpTokenExchange;
///
/// let exchange = HttpTokenExchange::new("https://api.example.com/auth/b2c/token");
/// ```
#[derive(Clone, Debug)]
pub struct HttpTokenExchange {
    /// Exchange endpoint.
    url: String,

    /// HTTP client for making requests.
    http_client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    code: &'a str,
    code_verifier: &'a str,
    redirect_uri: &'a str,
}

impl HttpTokenExchange {
    /// Create an exchange client for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http_client: Client::new(),
        }
    }

    /// Create an exchange client for the configured `exchange_url`.
    #[must_use]
    pub fn from_config(config: &B2cConfig) -> Self {
        Self::new(config.exchange_url.clone())
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }
}

impl TokenExchange for HttpTokenExchange {
    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> Result<ExchangeResponse> {
        let body = ExchangeRequest {
            code,
            code_verifier,
            redirect_uri,
        };

        let response = self
            .http_client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %error_body, "Code exchange rejected");
            return Err(AuthError::TokenExchangeFailed(format!(
                "backend returned HTTP {status}"
            )));
        }

        let exchanged: ExchangeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchangeFailed(format!("invalid response body: {e}")))?;

        if exchanged.token.trim().is_empty() {
            return Err(AuthError::TokenExchangeFailed(
                "response contained an empty token".to_string(),
            ));
        }

        tracing::debug!("Authorization code exchanged");
        Ok(exchanged)
    }
}
