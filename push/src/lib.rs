//! # Portal Push
//!
//! Push notifications for the member portal client.
//!
//! ## Components
//!
//! - **Registration pipeline** ([`registration`]): permission → messaging
//!   token → device id → backend binding, run once after login
//! - **Foreground router** ([`router`]): notification list, unread badge,
//!   toasts and click-to-navigate for messages received in the foreground
//! - **Sign-out** ([`sign_out()`]): clears credentials, caches, push token and
//!   notifications
//!
//! Platform services (the push provider, display, navigation) are traits in
//! [`providers`]; the embedding application implements them.
//!
//! ## Example: After Login
//!
//! ```ignore
//! use portal_push::{ForegroundRouter, RegistrationPipeline, RouterEnvironment};
//!
//! let pipeline = RegistrationPipeline::new(provider.clone(), backend, storage, PushConfig::from_env()?);
//! if let Some(claims) = decoder.claims().await? {
//!     pipeline
//!         .register_device(claims.user_id().unwrap_or_default(), claims.tenant_id().unwrap_or_default())
//!         .await;
//! }
//!
//! let router = ForegroundRouter::new(RouterEnvironment::new(SystemClock, notifier, navigator));
//! let subscription = router.subscribe(&provider);
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod config;
pub mod device;
pub mod error;
pub mod message;
pub mod providers;
pub mod registration;
pub mod router;
pub mod sign_out;

// Mock implementations (available in tests and with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use config::{PushConfig, SignOutOptions};
pub use device::DeviceId;
pub use error::{PushError, Result};
pub use message::{MessageNotification, PushMessage};
pub use providers::{
    HttpRegistrationBackend, Navigator, Notifier, PermissionState, PushProvider,
    RegistrationBackend,
};
pub use registration::{
    PushBinding, PushToken, RegistrationEvent, RegistrationHandle, RegistrationPipeline,
    RegistrationStage,
};
pub use router::{
    ClickRoute, ForegroundRouter, NotificationRecord, NotificationState, RouterAction,
    RouterEnvironment, RouterSubscription,
};
pub use sign_out::{sign_out, SignOutReport};
