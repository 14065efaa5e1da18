//! Push message payloads.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Display part of a push message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageNotification {
    /// Title line.
    #[serde(default)]
    pub title: Option<String>,
    /// Body text.
    #[serde(default)]
    pub body: Option<String>,
}

/// A message delivered by the push provider while the app is in the foreground.
///
/// Mirrors the provider payload:
///
/// ```json
/// {
///   "messageId": "m1",
///   "from": "1234567890",
///   "notification": { "title": "T", "body": "B" },
///   "data": { "roomId": "r-9" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Provider-assigned id.
    pub message_id: String,
    /// Sender id.
    #[serde(default)]
    pub from: Option<String>,
    /// Display part; absent for data-only pushes.
    #[serde(default)]
    pub notification: Option<MessageNotification>,
    /// Custom key-value payload.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl PushMessage {
    /// Create a message with a title and body.
    #[must_use]
    pub fn new(message_id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            from: None,
            notification: Some(MessageNotification {
                title: Some(title.into()),
                body: Some(body.into()),
            }),
            data: HashMap::new(),
        }
    }

    /// Create a data-only message.
    #[must_use]
    pub fn data_only(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            ..Self::default()
        }
    }

    /// Set the sender.
    #[must_use]
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Add a data entry.
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Title and body if both are present and non-empty.
    #[must_use]
    pub fn displayable(&self) -> Option<(&str, &str)> {
        let notification = self.notification.as_ref()?;
        let title = notification.title.as_deref().filter(|t| !t.is_empty())?;
        let body = notification.body.as_deref().filter(|b| !b.is_empty())?;
        Some((title, body))
    }
}
