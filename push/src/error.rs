//! Error types for push notification handling.

use portal_auth::AuthError;
use thiserror::Error;

/// Result type alias for push operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Push subsystem errors.
///
/// Most of these never reach application code: the registration pipeline
/// degrades to a sentinel token or a no-op and logs instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    /// The user declined notifications.
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The platform has no notification or push capability.
    #[error("Push notifications are not supported on this platform")]
    Unsupported,

    /// The push provider did not return a messaging token.
    #[error("Messaging token unavailable: {0}")]
    TokenUnavailable(String),

    /// The backend rejected the binding or was unreachable.
    #[error("Device registration failed: {0}")]
    RegistrationFailed(String),

    /// The push provider failed.
    #[error("Push provider error: {0}")]
    ProviderError(String),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Required configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A notification points at a route this client does not handle yet.
    #[error("Route not implemented: {route}")]
    RouteNotImplemented {
        /// Description of the requested route
        route: String,
    },

    /// The navigator could not open the route.
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),
}

impl From<AuthError> for PushError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::StorageError(message) | AuthError::SerializationError(message) => {
                Self::Storage(message)
            },
            AuthError::ConfigError(message) => Self::ConfigError(message),
            other => Self::RegistrationFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_storage_error_maps_to_storage() {
        assert_eq!(
            PushError::from(AuthError::StorageError("disk full".into())),
            PushError::Storage("disk full".into())
        );
    }

    #[test]
    fn test_missing_secret_maps_to_registration_failure() {
        assert!(matches!(
            PushError::from(AuthError::MissingSecret),
            PushError::RegistrationFailed(_)
        ));
    }
}
