//! Push registration pipeline.
//!
//! Runs after login: ask for notification permission, retrieve a messaging
//! token, resolve the device id and bind all of it to the signed-in user at
//! the backend. Every step degrades instead of failing:
//!
//! - an unsupported platform or a denied prompt stops the pipeline
//! - a token failure yields [`PushToken::Unavailable`]
//! - a backend failure is logged, counted and reported as a
//!   [`RegistrationEvent::Failed`], never retried
//!
//! Binding runs as an effect of the registration store, so [`RegistrationPipeline::bind`]
//! returns immediately with a [`RegistrationHandle`] that can be awaited for
//! the outcome.
//!
//! # Example
//!
//! ```ignore
//! let pipeline = RegistrationPipeline::new(provider, backend, storage, config);
//!
//! if let Some(handle) = pipeline.register_device(&claims_user_id, &tenant_id).await {
//!     // Optional: only tests and diagnostics wait for the outcome
//!     let event = handle.outcome().await;
//! }
//! ```

pub mod reducer;

pub use reducer::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationStage,
    RegistrationState,
};

use crate::config::PushConfig;
use crate::device::DeviceId;
use crate::error::{PushError, Result};
use crate::providers::{PermissionState, PushProvider, RegistrationBackend};
use futures::Stream;
use portal_auth::constants::storage_keys;
use portal_auth::KeyValueStore;
use portal_runtime::{Store, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Outcome of messaging-token retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PushToken {
    /// Token issued by the push provider.
    Token(String),
    /// Retrieval failed; the pipeline stops here.
    Unavailable,
}

impl PushToken {
    /// The token value, if one was issued.
    #[must_use]
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(token) => Some(token),
            Self::Unavailable => None,
        }
    }

    /// Returns `true` for a real token.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Token(_))
    }
}

/// Association of a messaging token with a device and a user.
///
/// Sent to the backend as:
///
/// ```json
/// { "fcmToken": "...", "userId": "...", "tenantId": "...", "deviceId": "...", "platform": "web" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushBinding {
    /// Messaging token.
    pub fcm_token: String,
    /// Signed-in user.
    pub user_id: String,
    /// Tenant of the user.
    pub tenant_id: String,
    /// Stable device identifier.
    pub device_id: String,
    /// Platform string, `web` by default.
    pub platform: String,
}

/// Outcome of one binding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationEvent {
    /// The backend accepted the binding.
    Registered {
        /// Registered binding.
        binding: PushBinding,
    },
    /// The binding was not registered.
    Failed {
        /// Binding that was attempted, if one could be built.
        binding: Option<PushBinding>,
        /// Failure.
        error: PushError,
    },
}

impl RegistrationEvent {
    /// Returns `true` for [`RegistrationEvent::Registered`].
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }

    fn from_action(action: RegistrationAction) -> Option<(u64, Self)> {
        match action {
            RegistrationAction::BindSucceeded { attempt, binding } => {
                Some((attempt, Self::Registered { binding }))
            },
            RegistrationAction::BindFailed {
                attempt,
                binding,
                error,
            } => Some((
                attempt,
                Self::Failed {
                    binding: Some(binding),
                    error,
                },
            )),
            _ => None,
        }
    }
}

enum HandleInner {
    Pending(broadcast::Receiver<RegistrationAction>),
    Ready(RegistrationEvent),
}

/// Handle to a detached binding attempt.
///
/// Dropping the handle does not cancel the attempt.
pub struct RegistrationHandle {
    attempt: u64,
    inner: HandleInner,
}

impl RegistrationHandle {
    const fn pending(attempt: u64, receiver: broadcast::Receiver<RegistrationAction>) -> Self {
        Self {
            attempt,
            inner: HandleInner::Pending(receiver),
        }
    }

    const fn ready(attempt: u64, event: RegistrationEvent) -> Self {
        Self {
            attempt,
            inner: HandleInner::Ready(event),
        }
    }

    /// Attempt number.
    #[must_use]
    pub const fn attempt(&self) -> u64 {
        self.attempt
    }

    /// Wait for the outcome of this attempt.
    pub async fn outcome(self) -> RegistrationEvent {
        let mut receiver = match self.inner {
            HandleInner::Ready(event) => return event,
            HandleInner::Pending(receiver) => receiver,
        };

        loop {
            match receiver.recv().await {
                Ok(action) => {
                    if let Some((attempt, event)) = RegistrationEvent::from_action(action) {
                        if attempt == self.attempt {
                            return event;
                        }
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, attempt = self.attempt, "Registration outcome receiver lagged");
                },
                Err(RecvError::Closed) => {
                    return RegistrationEvent::Failed {
                        binding: None,
                        error: PushError::RegistrationFailed(
                            "registration store closed".to_string(),
                        ),
                    };
                },
            }
        }
    }

    /// Wait for the outcome with a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if no outcome arrives in time.
    pub async fn outcome_with_timeout(self, timeout: Duration) -> std::result::Result<RegistrationEvent, StoreError> {
        tokio::time::timeout(timeout, self.outcome())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for RegistrationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationHandle")
            .field("attempt", &self.attempt)
            .field("ready", &matches!(self.inner, HandleInner::Ready(_)))
            .finish()
    }
}

/// Store running the registration reducer.
pub type RegistrationStore<B> =
    Store<RegistrationState, RegistrationAction, RegistrationEnvironment<B>, RegistrationReducer<B>>;

/// Post-login push registration.
///
/// Owns the `fcmDeviceId` and `fcmToken` storage keys.
pub struct RegistrationPipeline<P, B, S>
where
    B: RegistrationBackend + Clone + 'static,
{
    provider: P,
    storage: S,
    config: PushConfig,
    store: RegistrationStore<B>,
    next_attempt: AtomicU64,
}

impl<P, B, S> RegistrationPipeline<P, B, S>
where
    P: PushProvider,
    B: RegistrationBackend + Clone + 'static,
    S: KeyValueStore,
{
    /// Create a pipeline.
    #[must_use]
    pub fn new(provider: P, backend: B, storage: S, config: PushConfig) -> Self {
        Self {
            provider,
            storage,
            config,
            store: Store::new(
                RegistrationState::default(),
                RegistrationReducer::new(),
                RegistrationEnvironment::new(backend),
            ),
            next_attempt: AtomicU64::new(0),
        }
    }

    /// Push provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Configuration.
    #[must_use]
    pub const fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Registration store.
    #[must_use]
    pub const fn store(&self) -> &RegistrationStore<B> {
        &self.store
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Permission
    // ═══════════════════════════════════════════════════════════════════════

    /// Resolve notification permission, prompting only if the user was never
    /// asked.
    ///
    /// Returns [`PermissionState::Unsupported`] without touching the provider
    /// further on platforms without push support.
    pub async fn request_permission(&self) -> PermissionState {
        if !self.provider.is_supported() {
            tracing::info!("Push notifications are not supported on this platform");
            self.dispatch(RegistrationAction::PermissionResolved(PermissionState::Unsupported))
                .await;
            return PermissionState::Unsupported;
        }

        let current = self.provider.permission().await;
        let permission = if current == PermissionState::Default {
            self.dispatch(RegistrationAction::PermissionPrompted).await;
            match self.provider.request_permission().await {
                Ok(permission) => permission,
                Err(error) => {
                    tracing::warn!(error = %error, "Permission prompt failed");
                    PermissionState::Default
                },
            }
        } else {
            current
        };

        tracing::debug!(?permission, "Notification permission resolved");
        self.dispatch(RegistrationAction::PermissionResolved(permission))
            .await;
        permission
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Token
    // ═══════════════════════════════════════════════════════════════════════

    /// Retrieve the messaging token for the configured VAPID key.
    ///
    /// Any failure yields [`PushToken::Unavailable`]. A retrieved token is
    /// cached under `fcmToken`.
    pub async fn fetch_token(&self) -> PushToken {
        let token = match self.provider.get_token(&self.config.vapid_key).await {
            Ok(token) if !token.trim().is_empty() => PushToken::Token(token),
            Ok(_) => {
                tracing::warn!("Push provider returned an empty messaging token");
                PushToken::Unavailable
            },
            Err(error) => {
                tracing::warn!(error = %error, "Messaging token unavailable");
                PushToken::Unavailable
            },
        };

        match &token {
            PushToken::Token(value) => self.cache_token(value).await,
            PushToken::Unavailable => {
                metrics::counter!("push.token.unavailable").increment(1);
            },
        }

        self.dispatch(RegistrationAction::TokenResolved(token.clone()))
            .await;
        token
    }

    async fn cache_token(&self, token: &str) {
        match self.storage.get(storage_keys::PUSH_TOKEN).await {
            Ok(Some(previous)) if previous != token => {
                tracing::info!("Messaging token rotated");
            },
            Ok(_) => {},
            Err(error) => tracing::warn!(error = %error, "Could not read cached messaging token"),
        }

        if let Err(error) = self.storage.set(storage_keys::PUSH_TOKEN, token).await {
            tracing::warn!(error = %error, "Could not cache messaging token");
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Binding
    // ═══════════════════════════════════════════════════════════════════════

    /// Stable identifier of this device.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Storage`] if storage fails.
    pub async fn device_id(&self) -> Result<DeviceId> {
        DeviceId::resolve(&self.storage).await
    }

    /// Register `token` for the user at the backend.
    ///
    /// Returns as soon as the attempt has started. The outcome arrives on the
    /// returned handle and on [`RegistrationPipeline::events`].
    pub async fn bind(
        &self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> RegistrationHandle {
        let attempt = self.next_attempt.fetch_add(1, Ordering::Relaxed) + 1;

        let device_id = match self.device_id().await {
            Ok(device_id) => device_id,
            Err(error) => {
                metrics::counter!("push.registration.failed").increment(1);
                tracing::warn!(attempt, error = %error, "Could not resolve device id");
                return RegistrationHandle::ready(
                    attempt,
                    RegistrationEvent::Failed {
                        binding: None,
                        error,
                    },
                );
            },
        };

        let binding = PushBinding {
            fcm_token: token.into(),
            user_id: user_id.into(),
            tenant_id: tenant_id.into(),
            device_id: device_id.to_string(),
            platform: self.config.platform.clone(),
        };

        // Subscribe first so the outcome cannot be missed
        let receiver = self.store.subscribe_actions();
        match self
            .store
            .send(RegistrationAction::Bind {
                attempt,
                binding: binding.clone(),
            })
            .await
        {
            Ok(_) => RegistrationHandle::pending(attempt, receiver),
            Err(error) => RegistrationHandle::ready(
                attempt,
                RegistrationEvent::Failed {
                    binding: Some(binding),
                    error: PushError::RegistrationFailed(error.to_string()),
                },
            ),
        }
    }

    /// Run permission, token and binding in order.
    ///
    /// Returns `None` if the pipeline stopped before binding: the platform is
    /// unsupported, permission was not granted or no token was issued.
    pub async fn register_device(
        &self,
        user_id: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Option<RegistrationHandle> {
        let permission = self.request_permission().await;
        if permission != PermissionState::Granted {
            tracing::info!(?permission, "Skipping push registration");
            return None;
        }

        let PushToken::Token(token) = self.fetch_token().await else {
            return None;
        };

        Some(self.bind(token, user_id, tenant_id).await)
    }

    /// Delete the messaging token at the provider and forget the cached one.
    ///
    /// Returns `false` if there was nothing to unbind.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Storage`] if storage fails.
    pub async fn unbind(&self) -> Result<bool> {
        let cached = self.storage.get(storage_keys::PUSH_TOKEN).await?;
        let holds_token = self
            .store
            .state(|s| {
                s.stage == RegistrationStage::Bound
                    || s.token.as_ref().is_some_and(PushToken::is_available)
            })
            .await;

        if cached.is_none() && !holds_token {
            tracing::debug!("No messaging token to unbind");
            return Ok(false);
        }

        match self.provider.delete_token().await {
            Ok(deleted) => tracing::debug!(deleted, "Provider token deleted"),
            Err(error) => tracing::warn!(error = %error, "Could not delete provider token"),
        }

        self.storage.remove(storage_keys::PUSH_TOKEN).await?;
        self.dispatch(RegistrationAction::Unbound).await;
        tracing::info!("Push token unbound");
        Ok(true)
    }

    /// Forget the device identifier. The next binding generates a new one.
    ///
    /// # Errors
    ///
    /// Returns [`PushError::Storage`] if storage fails.
    pub async fn forget_device(&self) -> Result<()> {
        self.storage.remove(storage_keys::DEVICE_ID).await?;
        tracing::info!("Device id forgotten");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Observation
    // ═══════════════════════════════════════════════════════════════════════

    /// Current stage.
    pub async fn stage(&self) -> RegistrationStage {
        self.store.state(|s| s.stage).await
    }

    /// Binding the backend last accepted.
    pub async fn current_binding(&self) -> Option<PushBinding> {
        self.store.state(|s| s.binding.clone()).await
    }

    /// Snapshot of the registration state.
    pub async fn snapshot(&self) -> RegistrationState {
        self.store.state(Clone::clone).await
    }

    /// Outcomes of every binding attempt started after this call.
    pub fn events(&self) -> impl Stream<Item = RegistrationEvent> + Send + 'static {
        let mut receiver = self.store.subscribe_actions();
        async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(action) => {
                        if let Some((_, event)) = RegistrationEvent::from_action(action) {
                            yield event;
                        }
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Registration event stream lagged");
                    },
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    async fn dispatch(&self, action: RegistrationAction) {
        if let Err(error) = self.store.send(action).await {
            tracing::debug!(error = %error, "Registration store rejected action");
        }
    }
}

impl<P, B, S> std::fmt::Debug for RegistrationPipeline<P, B, S>
where
    B: RegistrationBackend + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationPipeline")
            .field("config", &self.config)
            .field("next_attempt", &self.next_attempt.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_serializes_camel_case() {
        let binding = PushBinding {
            fcm_token: "tok".into(),
            user_id: "u".into(),
            tenant_id: "t".into(),
            device_id: "d".into(),
            platform: "web".into(),
        };
        let json = serde_json::to_value(&binding).unwrap_or_default();
        assert_eq!(json["fcmToken"], "tok");
        assert_eq!(json["userId"], "u");
        assert_eq!(json["tenantId"], "t");
        assert_eq!(json["deviceId"], "d");
        assert_eq!(json["platform"], "web");
    }

    #[test]
    fn test_push_token_accessors() {
        assert_eq!(PushToken::Token("a".into()).as_token(), Some("a"));
        assert!(!PushToken::Unavailable.is_available());
    }
}
