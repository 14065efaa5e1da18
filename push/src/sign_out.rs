//! Sign-out.
//!
//! Clears everything the session left behind on this device: credentials,
//! cached lookup tables, the push token and the foreground notifications.
//! Safe to call repeatedly; the provider token is deleted only once.

use crate::config::SignOutOptions;
use crate::error::Result;
use crate::providers::{Navigator, Notifier, PushProvider, RegistrationBackend};
use crate::registration::RegistrationPipeline;
use crate::router::ForegroundRouter;
use portal_auth::{CredentialStore, KeyValueStore};
use portal_core::environment::Clock;

/// What a sign-out did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignOutReport {
    /// A push token was unbound by this call.
    pub push_unbound: bool,
    /// The device id was forgotten.
    pub device_forgotten: bool,
}

/// Sign the user out of this device.
///
/// Push unbinding failures are logged and reported as
/// `push_unbound: false`; they never block sign-out.
///
/// # Errors
///
/// Returns [`crate::PushError::Storage`] if credentials or lookup caches
/// cannot be cleared.
pub async fn sign_out<S, P, B, R, C, N, V>(
    credentials: &CredentialStore<S>,
    registration: &RegistrationPipeline<P, B, R>,
    router: &ForegroundRouter<C, N, V>,
    options: &SignOutOptions,
) -> Result<SignOutReport>
where
    S: KeyValueStore,
    P: PushProvider,
    B: RegistrationBackend + Clone + 'static,
    R: KeyValueStore,
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    credentials.clear().await?;
    credentials
        .clear_lookup_cache(&options.lookup_cache_keys)
        .await?;

    let push_unbound = match registration.unbind().await {
        Ok(unbound) => unbound,
        Err(error) => {
            tracing::warn!(error = %error, "Could not unbind push token");
            false
        },
    };

    let device_forgotten = if options.forget_device {
        match registration.forget_device().await {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(error = %error, "Could not forget device id");
                false
            },
        }
    } else {
        false
    };

    router.clear().await;

    tracing::info!(push_unbound, device_forgotten, "Signed out");
    Ok(SignOutReport {
        push_unbound,
        device_forgotten,
    })
}
