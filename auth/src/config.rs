//! Authentication configuration.
//!
//! Values come from the deployment environment, never from code. Each struct
//! has a `from_env()` constructor reading `PORTAL_*` variables plus builder
//! methods for tests and embedding applications.

use crate::error::{AuthError, Result};

/// Environment variable holding the shared token secret.
pub const ENV_TOKEN_SECRET: &str = "PORTAL_TOKEN_SECRET";

/// Environment variable holding the B2C authorize endpoint.
pub const ENV_B2C_AUTHORIZE_URL: &str = "PORTAL_B2C_AUTHORIZE_URL";

/// Environment variable holding the B2C user-flow policy name.
pub const ENV_B2C_POLICY: &str = "PORTAL_B2C_POLICY";

/// Environment variable holding the B2C application client id.
pub const ENV_B2C_CLIENT_ID: &str = "PORTAL_B2C_CLIENT_ID";

/// Environment variable holding the registered redirect URI.
pub const ENV_B2C_REDIRECT_URI: &str = "PORTAL_B2C_REDIRECT_URI";

/// Environment variable holding the backend code-exchange endpoint.
pub const ENV_B2C_EXCHANGE_URL: &str = "PORTAL_B2C_EXCHANGE_URL";

/// Token decryption configuration.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Shared secret the backend encrypts bearer tokens with.
    ///
    /// May be empty; decrypting an encrypted token then fails with
    /// [`AuthError::MissingSecret`].
    pub token_secret: String,
}

impl AuthConfig {
    /// Create configuration with the given secret.
    #[must_use]
    pub const fn new(token_secret: String) -> Self {
        Self { token_secret }
    }

    /// Read `PORTAL_TOKEN_SECRET`.
    ///
    /// A missing variable is not an error here; it surfaces as
    /// [`AuthError::MissingSecret`] the first time an encrypted token is
    /// decoded.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            token_secret: std::env::var(ENV_TOKEN_SECRET).unwrap_or_default(),
        }
    }

    /// Returns `true` if a secret is configured.
    #[must_use]
    pub fn has_secret(&self) -> bool {
        !self.token_secret.is_empty()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &if self.has_secret() { "<redacted>" } else { "<unset>" })
            .finish()
    }
}

/// Azure AD B2C authorization configuration.
#[derive(Debug, Clone)]
pub struct B2cConfig {
    /// Authorize endpoint, e.g. `https://tenant.b2clogin.com/tenant.onmicrosoft.com/oauth2/v2.0/authorize`.
    pub authorize_url: String,

    /// User-flow policy sent as the `p` parameter.
    pub policy: String,

    /// Application (client) id.
    pub client_id: String,

    /// Redirect URI registered with B2C.
    pub redirect_uri: String,

    /// Backend endpoint that exchanges the authorization code.
    pub exchange_url: String,

    /// Requested scopes.
    ///
    /// Default: `openid offline_access`
    pub scope: String,

    /// Value of the `prompt` parameter.
    ///
    /// Default: `login`
    pub prompt: String,
}

impl B2cConfig {
    /// Create configuration with default scope and prompt.
    #[must_use]
    pub fn new(
        authorize_url: String,
        policy: String,
        client_id: String,
        redirect_uri: String,
        exchange_url: String,
    ) -> Self {
        Self {
            authorize_url,
            policy,
            client_id,
            redirect_uri,
            exchange_url,
            scope: "openid offline_access".to_string(),
            prompt: "login".to_string(),
        }
    }

    /// Read all `PORTAL_B2C_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ConfigError`] naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(
            required_env(ENV_B2C_AUTHORIZE_URL)?,
            required_env(ENV_B2C_POLICY)?,
            required_env(ENV_B2C_CLIENT_ID)?,
            required_env(ENV_B2C_REDIRECT_URI)?,
            required_env(ENV_B2C_EXCHANGE_URL)?,
        ))
    }

    /// Set requested scopes.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Set the `prompt` parameter.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(AuthError::ConfigError(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_debug_redacts_secret() {
        let config = AuthConfig::new("hunter2".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(format!("{:?}", AuthConfig::default()).contains("<unset>"));
    }

    #[test]
    fn test_b2c_defaults() {
        let config = B2cConfig::new(
            "https://login.example.com/authorize".to_string(),
            "B2C_1_signin".to_string(),
            "client".to_string(),
            "https://portal.example.com/callback".to_string(),
            "https://api.example.com/auth/exchange".to_string(),
        );
        assert_eq!(config.scope, "openid offline_access");
        assert_eq!(config.prompt, "login");

        let config = config.with_prompt("select_account");
        assert_eq!(config.prompt, "select_account");
    }

    #[test]
    fn test_required_env_reports_name() {
        let err = required_env("PORTAL_TEST_DEFINITELY_UNSET_VARIABLE");
        assert_eq!(
            err,
            Err(AuthError::ConfigError(
                "PORTAL_TEST_DEFINITELY_UNSET_VARIABLE is not set".to_string()
            ))
        );
    }
}
