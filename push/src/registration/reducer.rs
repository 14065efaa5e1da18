//! Registration state machine.
//!
//! ```text
//! Uninitialized → PermissionRequested → {Granted, Denied} → TokenFetched → Bound
//! ```
//!
//! The reducer records permission and token outcomes reported by the
//! pipeline and owns the backend binding call. A `Bind` action starts the
//! binding as an effect; its outcome comes back as `BindSucceeded` or
//! `BindFailed` and is broadcast by the store to registration handles.

use super::{PushBinding, PushToken};
use crate::error::PushError;
use crate::providers::{PermissionState, RegistrationBackend};
use portal_core::effect::Effect;
use portal_core::reducer::Reducer;
use portal_core::{smallvec, SmallVec};
use std::marker::PhantomData;

/// Pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RegistrationStage {
    /// Nothing has happened yet, or the platform is unsupported.
    #[default]
    Uninitialized,
    /// The permission prompt is showing.
    PermissionRequested,
    /// Notifications are allowed.
    Granted,
    /// Notifications are blocked. Terminal for this session.
    Denied,
    /// A messaging token was retrieved.
    TokenFetched,
    /// The backend accepted the binding.
    Bound,
}

/// Registration state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationState {
    /// Current stage.
    pub stage: RegistrationStage,
    /// Last known permission.
    pub permission: Option<PermissionState>,
    /// Last token outcome.
    pub token: Option<PushToken>,
    /// Binding the backend last accepted.
    pub binding: Option<PushBinding>,
    /// Most recent binding attempt.
    pub latest_attempt: Option<u64>,
    /// Attempts up to and including this one were revoked by sign-out.
    pub revoked_through: Option<u64>,
    /// Whether the most recent attempt is still running.
    pub in_flight: bool,
    /// Error of the most recent failed attempt.
    pub last_error: Option<PushError>,
}

/// Registration actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationAction {
    /// The permission prompt was shown.
    PermissionPrompted,
    /// Permission is known.
    PermissionResolved(PermissionState),
    /// Token retrieval finished.
    TokenResolved(PushToken),
    /// Register `binding` with the backend.
    Bind {
        /// Attempt number, unique per pipeline.
        attempt: u64,
        /// Binding to register.
        binding: PushBinding,
    },
    /// The backend accepted the binding.
    BindSucceeded {
        /// Attempt number.
        attempt: u64,
        /// Registered binding.
        binding: PushBinding,
    },
    /// Registration failed. Not retried.
    BindFailed {
        /// Attempt number.
        attempt: u64,
        /// Binding that was rejected.
        binding: PushBinding,
        /// Failure.
        error: PushError,
    },
    /// The token was deleted on sign-out.
    Unbound,
}

/// Collaborators of the registration reducer.
#[derive(Debug, Clone)]
pub struct RegistrationEnvironment<B> {
    /// Backend receiving bindings.
    pub backend: B,
}

impl<B> RegistrationEnvironment<B> {
    /// Create an environment around `backend`.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }
}

/// Reducer for [`RegistrationState`].
#[derive(Debug)]
pub struct RegistrationReducer<B> {
    _backend: PhantomData<fn() -> B>,
}

impl<B> RegistrationReducer<B> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B> Default for RegistrationReducer<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Clone for RegistrationReducer<B> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<B> RegistrationReducer<B> {
    fn is_latest(state: &RegistrationState, attempt: u64) -> bool {
        state.latest_attempt.is_none_or(|latest| attempt >= latest)
            && state.revoked_through.is_none_or(|revoked| attempt > revoked)
    }
}

impl<B> Reducer for RegistrationReducer<B>
where
    B: RegistrationBackend + Clone + 'static,
{
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment<B>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Permission
            // ═══════════════════════════════════════════════════════════════
            RegistrationAction::PermissionPrompted => {
                state.stage = RegistrationStage::PermissionRequested;
                smallvec![Effect::None]
            },

            RegistrationAction::PermissionResolved(permission) => {
                state.permission = Some(permission);
                match permission {
                    PermissionState::Granted => {
                        // A later permission check must not demote a fetched or bound token
                        if !matches!(
                            state.stage,
                            RegistrationStage::TokenFetched | RegistrationStage::Bound
                        ) {
                            state.stage = RegistrationStage::Granted;
                        }
                    },
                    PermissionState::Denied => state.stage = RegistrationStage::Denied,
                    PermissionState::Unsupported => state.stage = RegistrationStage::Uninitialized,
                    // Prompt dismissed without a decision
                    PermissionState::Default => {
                        if state.stage == RegistrationStage::PermissionRequested {
                            state.stage = RegistrationStage::Uninitialized;
                        }
                    },
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Token
            // ═══════════════════════════════════════════════════════════════
            RegistrationAction::TokenResolved(token) => {
                if let PushToken::Token(value) = &token {
                    let already_bound = state.stage == RegistrationStage::Bound
                        && state
                            .binding
                            .as_ref()
                            .is_some_and(|binding| &binding.fcm_token == value);
                    if !already_bound {
                        state.stage = RegistrationStage::TokenFetched;
                    }
                }
                state.token = Some(token);
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Binding
            // ═══════════════════════════════════════════════════════════════
            RegistrationAction::Bind { attempt, binding } => {
                state.latest_attempt = Some(attempt);
                state.in_flight = true;

                let backend = env.backend.clone();
                smallvec![Effect::future(async move {
                    match backend.register(&binding).await {
                        Ok(()) => {
                            metrics::counter!("push.registration.succeeded").increment(1);
                            tracing::info!(
                                attempt,
                                device_id = %binding.device_id,
                                platform = %binding.platform,
                                "Device registered for push"
                            );
                            Some(RegistrationAction::BindSucceeded { attempt, binding })
                        },
                        Err(error) => {
                            metrics::counter!("push.registration.failed").increment(1);
                            tracing::warn!(
                                attempt,
                                device_id = %binding.device_id,
                                error = %error,
                                "Device registration failed"
                            );
                            Some(RegistrationAction::BindFailed {
                                attempt,
                                binding,
                                error,
                            })
                        },
                    }
                })]
            },

            RegistrationAction::BindSucceeded { attempt, binding } => {
                if Self::is_latest(state, attempt) {
                    state.in_flight = false;
                    state.stage = RegistrationStage::Bound;
                    state.binding = Some(binding);
                    state.last_error = None;
                }
                smallvec![Effect::None]
            },

            RegistrationAction::BindFailed { attempt, error, .. } => {
                // The token stays valid; only the binding is missing
                if Self::is_latest(state, attempt) {
                    state.in_flight = false;
                    state.last_error = Some(error);
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Sign-out
            // ═══════════════════════════════════════════════════════════════
            RegistrationAction::Unbound => {
                // Outcomes of attempts started before sign-out must not rebind
                if state.latest_attempt.is_some() {
                    state.revoked_through = state.latest_attempt;
                }
                state.token = None;
                state.binding = None;
                state.in_flight = false;
                state.stage = if state.permission == Some(PermissionState::Granted) {
                    RegistrationStage::Granted
                } else {
                    RegistrationStage::Uninitialized
                };
                smallvec![Effect::None]
            },
        }
    }
}
