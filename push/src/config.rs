//! Push configuration.

use crate::error::{PushError, Result};

/// Environment variable holding the VAPID public key.
pub const ENV_VAPID_KEY: &str = "PORTAL_VAPID_KEY";

/// Environment variable holding the backend registration endpoint.
pub const ENV_REGISTRATION_URL: &str = "PORTAL_PUSH_REGISTRATION_URL";

/// Environment variable overriding the reported platform.
pub const ENV_PLATFORM: &str = "PORTAL_PUSH_PLATFORM";

/// Platform reported in bindings when none is configured.
pub const DEFAULT_PLATFORM: &str = "web";

/// Route opened when a notification without a specific target is clicked.
pub const DEFAULT_NOTIFICATIONS_ROUTE: &str = "/notifications";

/// Push registration configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushConfig {
    /// VAPID public key passed to the push provider.
    pub vapid_key: String,

    /// Backend endpoint receiving device bindings.
    pub registration_url: String,

    /// Platform string sent with each binding.
    ///
    /// Default: `web`
    pub platform: String,
}

impl PushConfig {
    /// Create configuration for the `web` platform.
    #[must_use]
    pub fn new(vapid_key: impl Into<String>, registration_url: impl Into<String>) -> Self {
        Self {
            vapid_key: vapid_key.into(),
            registration_url: registration_url.into(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }

    /// Read `PORTAL_VAPID_KEY`, `PORTAL_PUSH_REGISTRATION_URL` and the
    /// optional `PORTAL_PUSH_PLATFORM`.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::ConfigError`] naming the first missing variable.
    pub fn from_env() -> Result<Self> {
        let config = Self::new(required_env(ENV_VAPID_KEY)?, required_env(ENV_REGISTRATION_URL)?);
        Ok(match std::env::var(ENV_PLATFORM) {
            Ok(platform) if !platform.trim().is_empty() => config.with_platform(platform),
            _ => config,
        })
    }

    /// Set the platform string.
    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(PushError::ConfigError(format!("{name} is not set"))),
    }
}

/// What sign-out removes besides credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignOutOptions {
    /// Cached lookup-table keys cleared on sign-out.
    pub lookup_cache_keys: Vec<String>,

    /// Also forget the device identifier.
    ///
    /// Default: false. The identifier lets the backend recognize the same
    /// browser profile across sessions.
    pub forget_device: bool,
}

impl SignOutOptions {
    /// Options clearing no lookup keys and keeping the device id.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lookup_cache_keys: Vec::new(),
            forget_device: false,
        }
    }

    /// Set the lookup-cache keys.
    #[must_use]
    pub fn with_lookup_cache_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.lookup_cache_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Forget the device id on sign-out.
    #[must_use]
    pub const fn with_forget_device(mut self, forget: bool) -> Self {
        self.forget_device = forget;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_config_defaults_to_web() {
        let config = PushConfig::new("vapid", "https://api.example.com/notifications/register");
        assert_eq!(config.platform, "web");
        assert_eq!(config.with_platform("android").platform, "android");
    }

    #[test]
    fn test_sign_out_options_builder() {
        let options = SignOutOptions::new()
            .with_lookup_cache_keys(["countries", "titles"])
            .with_forget_device(true);
        assert_eq!(options.lookup_cache_keys, vec!["countries", "titles"]);
        assert!(options.forget_device);
        assert_eq!(SignOutOptions::default(), SignOutOptions::new());
    }
}
