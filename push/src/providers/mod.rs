//! Push providers.
//!
//! Traits for the platform and backend collaborators of the push subsystem.
//! The registration pipeline and the router depend on these traits; the
//! embedding application supplies the platform implementations.
//!
//! - [`PushProvider`]: permission prompt, messaging token, foreground messages
//! - [`RegistrationBackend`]: stores device bindings
//! - [`Notifier`]: toasts and platform notifications
//! - [`Navigator`]: opens in-app routes
//!
//! [`HttpRegistrationBackend`] is the production [`RegistrationBackend`].

pub mod http_registration;

pub use http_registration::HttpRegistrationBackend;

use crate::error::Result;
use crate::message::PushMessage;
use crate::registration::PushBinding;
use crate::router::NotificationRecord;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Notification permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The user has not been asked yet.
    Default,
    /// The user allowed notifications.
    Granted,
    /// The user blocked notifications.
    Denied,
    /// The platform cannot show notifications.
    Unsupported,
}

/// Platform push service (permission, token, foreground messages).
pub trait PushProvider: Send + Sync {
    /// Returns `true` if the platform supports notifications and push.
    fn is_supported(&self) -> bool;

    /// Current permission without prompting.
    fn permission(&self) -> impl std::future::Future<Output = PermissionState> + Send;

    /// Show the permission prompt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PushError::ProviderError`] if the prompt cannot be shown.
    fn request_permission(&self) -> impl std::future::Future<Output = Result<PermissionState>> + Send;

    /// Retrieve a messaging token for `vapid_key`.
    ///
    /// # Errors
    ///
    /// Returns error if permission is missing or the provider fails.
    fn get_token(&self, vapid_key: &str) -> impl std::future::Future<Output = Result<String>> + Send;

    /// Invalidate the current messaging token at the provider.
    ///
    /// Returns `true` if a token was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PushError::ProviderError`] if the provider fails.
    fn delete_token(&self) -> impl std::future::Future<Output = Result<bool>> + Send;

    /// Messages received while the app is in the foreground.
    ///
    /// The stream ends when the provider shuts down.
    fn messages(&self) -> BoxStream<'static, PushMessage>;
}

/// Backend endpoint that stores device bindings.
///
/// Expected to be idempotent on `deviceId`.
pub trait RegistrationBackend: Send + Sync {
    /// Register `binding`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PushError::RegistrationFailed`] if the backend
    /// rejects the binding or is unreachable.
    fn register(&self, binding: &PushBinding) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Displays foreground notifications.
pub trait Notifier: Send + Sync {
    /// Show a transient in-app toast.
    fn show_toast(&self, record: &NotificationRecord);

    /// Raise a platform notification. A click on it should be reported to
    /// the router as a `NotificationClicked` action.
    ///
    /// # Errors
    ///
    /// Returns error if the platform refuses to show the notification.
    fn show_notification(&self, record: &NotificationRecord) -> Result<()>;
}

/// Opens in-app routes.
///
/// Injected into the router instead of read from a global.
pub trait Navigator: Send + Sync {
    /// Navigate to `route`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::PushError::NavigationFailed`] if the route cannot be opened.
    fn navigate(&self, route: &str) -> Result<()>;
}
