//! HTTP device registration against the portal backend.

use crate::config::PushConfig;
use crate::error::{PushError, Result};
use crate::providers::RegistrationBackend;
use crate::registration::PushBinding;
use portal_auth::{KeyValueStore, SessionDecoder};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Posts device bindings to the registration endpoint.
///
/// Each request carries the decrypted session token as a bearer token. The
/// backend answers `200` with `{ "success": true }` (or `isSuccess`) when
/// the binding was stored; anything else is a failure.
#[derive(Clone, Debug)]
pub struct HttpRegistrationBackend<S> {
    /// Registration endpoint.
    url: String,

    /// HTTP client for making requests.
    http_client: Client,

    /// Source of the bearer token.
    session: SessionDecoder<S>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    is_success: Option<bool>,
}

impl RegistrationResponse {
    fn accepted(&self) -> bool {
        self.success.or(self.is_success).unwrap_or(false)
    }
}

impl<S: KeyValueStore> HttpRegistrationBackend<S> {
    /// Create a backend for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>, session: SessionDecoder<S>) -> Self {
        Self {
            url: url.into(),
            http_client: Client::new(),
            session,
        }
    }

    /// Create a backend for the configured `registration_url`.
    #[must_use]
    pub fn from_config(config: &PushConfig, session: SessionDecoder<S>) -> Self {
        Self::new(config.registration_url.clone(), session)
    }

    /// Use a preconfigured HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }
}

impl<S: KeyValueStore> RegistrationBackend for HttpRegistrationBackend<S> {
    async fn register(&self, binding: &PushBinding) -> Result<()> {
        let token = self
            .session
            .bearer_token()
            .await?
            .ok_or_else(|| PushError::RegistrationFailed("no valid session".to_string()))?;

        let response = self
            .http_client
            .post(&self.url)
            .bearer_auth(token)
            .json(binding)
            .send()
            .await
            .map_err(|e| PushError::RegistrationFailed(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "Registration endpoint rejected binding");
            return Err(PushError::RegistrationFailed(format!(
                "backend returned HTTP {status}"
            )));
        }

        let body: RegistrationResponse = response
            .json()
            .await
            .map_err(|e| PushError::RegistrationFailed(format!("invalid response body: {e}")))?;

        if !body.accepted() {
            return Err(PushError::RegistrationFailed(
                "backend did not confirm the binding".to_string(),
            ));
        }

        Ok(())
    }
}
