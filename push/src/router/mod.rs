//! Foreground message router.
//!
//! Forwards messages delivered while the app is in the foreground into a
//! [`NotificationReducer`] store. The store keeps the notification list,
//! raises a toast and a platform notification per message, and routes
//! notification clicks through the injected [`crate::providers::Navigator`].
//!
//! # Example
//!
//! ```ignore
//! let router = ForegroundRouter::new(RouterEnvironment::new(SystemClock, notifier, navigator));
//! let subscription = router.subscribe(&provider);
//!
//! // On sign-out or unmount
//! subscription.unsubscribe();
//! ```

pub mod reducer;

pub use reducer::{NotificationReducer, NotificationState, RouterAction, RouterEnvironment};

use crate::providers::{Navigator, Notifier, PushProvider};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use portal_core::environment::Clock;
use portal_runtime::{EffectHandle, Store, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// A displayed foreground notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Provider message id.
    pub message_id: String,
    /// Sender id.
    pub from: Option<String>,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Whether the user has seen it.
    pub read: bool,
    /// Receipt time.
    pub timestamp: DateTime<Utc>,
    /// Custom payload of the message.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// Where a clicked notification leads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClickRoute {
    /// The notifications list.
    NotificationsList,
    /// A chat room. Not routable yet.
    Conversation {
        /// Room from the message payload.
        room_id: String,
    },
}

impl ClickRoute {
    /// Route for a message payload: `roomId` (or `room_id`) selects a
    /// conversation, anything else the notifications list.
    #[must_use]
    pub fn from_data(data: &HashMap<String, String>) -> Self {
        data.get("roomId")
            .or_else(|| data.get("room_id"))
            .filter(|room| !room.trim().is_empty())
            .map_or(Self::NotificationsList, |room| Self::Conversation {
                room_id: room.clone(),
            })
    }
}

/// Store running the notification reducer.
pub type RouterStore<C, N, V> =
    Store<NotificationState, RouterAction, RouterEnvironment<C, N, V>, NotificationReducer<C, N, V>>;

/// Foreground notification router.
///
/// Cloning yields another handle to the same notification state.
pub struct ForegroundRouter<C, N, V>
where
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    store: RouterStore<C, N, V>,
}

impl<C, N, V> Clone for ForegroundRouter<C, N, V>
where
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<C, N, V> ForegroundRouter<C, N, V>
where
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    /// Create a router with an empty notification list.
    #[must_use]
    pub fn new(environment: RouterEnvironment<C, N, V>) -> Self {
        Self::from_store(Store::new(
            NotificationState::default(),
            NotificationReducer::new(),
            environment,
        ))
    }

    /// Wrap an existing store.
    #[must_use]
    pub const fn from_store(store: RouterStore<C, N, V>) -> Self {
        Self { store }
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &RouterStore<C, N, V> {
        &self.store
    }

    /// Forward the provider's foreground messages into the store until the
    /// subscription is dropped.
    #[must_use = "dropping the subscription stops message forwarding"]
    pub fn subscribe<P: PushProvider>(&self, provider: &P) -> RouterSubscription {
        let mut messages = provider.messages();
        let store = self.store.clone();

        let task = tokio::spawn(async move {
            while let Some(message) = messages.next().await {
                if let Err(error) = store.send(RouterAction::MessageReceived(message)).await {
                    tracing::debug!(error = %error, "Router store closed, stopping forwarding");
                    break;
                }
            }
            tracing::debug!("Foreground message stream ended");
        });

        tracing::debug!("Subscribed to foreground messages");
        RouterSubscription { task }
    }

    /// Send an action.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after the store shut down.
    pub async fn send(&self, action: RouterAction) -> Result<EffectHandle, StoreError> {
        self.store.send(action).await
    }

    /// Report a click on the notification raised for `message_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after the store shut down.
    pub async fn click(&self, message_id: impl Into<String>) -> Result<EffectHandle, StoreError> {
        self.send(RouterAction::NotificationClicked {
            message_id: message_id.into(),
        })
        .await
    }

    /// Drop all notifications.
    pub async fn clear(&self) {
        if let Err(error) = self.send(RouterAction::Clear).await {
            tracing::debug!(error = %error, "Could not clear notifications");
        }
    }

    /// Snapshot of the notification state.
    pub async fn snapshot(&self) -> NotificationState {
        self.store.state(Clone::clone).await
    }

    /// Unread count.
    pub async fn unread(&self) -> usize {
        self.store.state(|s| s.unread).await
    }
}

impl<C, N, V> std::fmt::Debug for ForegroundRouter<C, N, V>
where
    C: Clock + Clone + 'static,
    N: Notifier + Clone + 'static,
    V: Navigator + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundRouter")
            .field("store", &self.store)
            .finish()
    }
}

/// Active forwarding of foreground messages.
///
/// Forwarding stops on [`RouterSubscription::unsubscribe`] or drop.
#[derive(Debug)]
pub struct RouterSubscription {
    task: JoinHandle<()>,
}

impl RouterSubscription {
    /// Returns `true` while messages are being forwarded.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop forwarding.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for RouterSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
