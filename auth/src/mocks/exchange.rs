//! Mock code exchange for testing.

use crate::error::{AuthError, Result};
use crate::providers::{ExchangeResponse, TokenExchange};
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Arguments of one recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeCall {
    /// Authorization code.
    pub code: String,
    /// PKCE verifier.
    pub code_verifier: String,
    /// Redirect URI.
    pub redirect_uri: String,
}

/// Mock code exchange.
///
/// Returns a fixed response (or fails) and records every call.
#[derive(Debug, Clone)]
pub struct MockTokenExchange {
    response: Option<ExchangeResponse>,
    calls: Arc<Mutex<Vec<ExchangeCall>>>,
}

impl MockTokenExchange {
    /// Create a mock that returns `response`.
    #[must_use]
    pub fn new(response: ExchangeResponse) -> Self {
        Self {
            response: Some(response),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that rejects every code.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Calls received so far.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn calls(&self) -> Result<Vec<ExchangeCall>> {
        Ok(self
            .calls
            .lock()
            .map_err(|_| AuthError::StorageError("Mutex lock failed".to_string()))?
            .clone())
    }
}

impl TokenExchange for MockTokenExchange {
    fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
        redirect_uri: &str,
    ) -> impl Future<Output = Result<ExchangeResponse>> + Send {
        let calls = Arc::clone(&self.calls);
        let response = self.response.clone();
        let call = ExchangeCall {
            code: code.to_string(),
            code_verifier: code_verifier.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };

        async move {
            calls
                .lock()
                .map_err(|_| AuthError::StorageError("Mutex lock failed".to_string()))?
                .push(call);

            response.ok_or_else(|| AuthError::TokenExchangeFailed("invalid authorization code".to_string()))
        }
    }
}
