//! Mock push provider for testing.

use crate::error::{PushError, Result};
use crate::message::PushMessage;
use crate::providers::{PermissionState, PushProvider};
use futures::stream::BoxStream;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Token issued by a new mock provider.
pub const MOCK_TOKEN: &str = "mock-fcm-token";

/// Mock push provider.
///
/// Starts supported, with permission `default`, a prompt that grants and a
/// token of [`MOCK_TOKEN`]. Messages pushed with
/// [`MockPushProvider::push_message`] reach every open message stream.
#[derive(Debug, Clone)]
pub struct MockPushProvider {
    supported: bool,
    permission: Arc<Mutex<PermissionState>>,
    prompt_result: PermissionState,
    token: Arc<Mutex<Option<String>>>,
    prompts: Arc<AtomicUsize>,
    token_requests: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
    messages: broadcast::Sender<PushMessage>,
}

impl MockPushProvider {
    /// Create a supported provider.
    #[must_use]
    pub fn new() -> Self {
        let (messages, _) = broadcast::channel(16);
        Self {
            supported: true,
            permission: Arc::new(Mutex::new(PermissionState::Default)),
            prompt_result: PermissionState::Granted,
            token: Arc::new(Mutex::new(Some(MOCK_TOKEN.to_string()))),
            prompts: Arc::new(AtomicUsize::new(0)),
            token_requests: Arc::new(AtomicUsize::new(0)),
            deletes: Arc::new(AtomicUsize::new(0)),
            messages,
        }
    }

    /// Create a provider for a platform without push support.
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Start with `permission` already decided.
    #[must_use]
    pub fn with_permission(self, permission: PermissionState) -> Self {
        if let Ok(mut current) = self.permission.lock() {
            *current = permission;
        }
        self
    }

    /// Answer the prompt with `permission`.
    #[must_use]
    pub const fn with_prompt_result(mut self, permission: PermissionState) -> Self {
        self.prompt_result = permission;
        self
    }

    /// Issue no token.
    #[must_use]
    pub fn without_token(self) -> Self {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
        self
    }

    /// Replace the token issued from now on.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn set_token(&self, token: Option<&str>) -> Result<()> {
        *self
            .token
            .lock()
            .map_err(|_| PushError::ProviderError("Mutex lock failed".to_string()))? =
            token.map(str::to_string);
        Ok(())
    }

    /// Deliver a foreground message. Returns the number of open streams.
    pub fn push_message(&self, message: PushMessage) -> usize {
        self.messages.send(message).unwrap_or(0)
    }

    /// Number of permission prompts shown.
    #[must_use]
    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    /// Number of token requests.
    #[must_use]
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    /// Number of token deletions.
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    fn current_permission(&self) -> PermissionState {
        self.permission
            .lock()
            .map_or(PermissionState::Default, |permission| *permission)
    }
}

impl Default for MockPushProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PushProvider for MockPushProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn permission(&self) -> impl Future<Output = PermissionState> + Send {
        let permission = self.current_permission();
        async move { permission }
    }

    fn request_permission(&self) -> impl Future<Output = Result<PermissionState>> + Send {
        let permission = Arc::clone(&self.permission);
        let prompts = Arc::clone(&self.prompts);
        let result = self.prompt_result;

        async move {
            prompts.fetch_add(1, Ordering::SeqCst);
            *permission
                .lock()
                .map_err(|_| PushError::ProviderError("Mutex lock failed".to_string()))? = result;
            Ok(result)
        }
    }

    fn get_token(&self, _vapid_key: &str) -> impl Future<Output = Result<String>> + Send {
        let permission = self.current_permission();
        let token = Arc::clone(&self.token);
        let token_requests = Arc::clone(&self.token_requests);

        async move {
            token_requests.fetch_add(1, Ordering::SeqCst);
            if permission != PermissionState::Granted {
                return Err(PushError::PermissionDenied);
            }
            token
                .lock()
                .map_err(|_| PushError::ProviderError("Mutex lock failed".to_string()))?
                .clone()
                .ok_or_else(|| PushError::TokenUnavailable("no token issued".to_string()))
        }
    }

    fn delete_token(&self) -> impl Future<Output = Result<bool>> + Send {
        let deletes = Arc::clone(&self.deletes);
        async move {
            deletes.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    fn messages(&self) -> BoxStream<'static, PushMessage> {
        let mut receiver = self.messages.subscribe();
        Box::pin(async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(message) => yield message,
                    Err(RecvError::Lagged(_)) => {},
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
