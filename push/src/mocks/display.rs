//! Recording notifier and navigator for testing.

use crate::error::{PushError, Result};
use crate::providers::{Navigator, Notifier};
use crate::router::NotificationRecord;
use std::sync::{Arc, Mutex};

fn lock_failed() -> PushError {
    PushError::ProviderError("Mutex lock failed".to_string())
}

/// Notifier that records what it was asked to show.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    toasts: Arc<Mutex<Vec<NotificationRecord>>>,
    notifications: Arc<Mutex<Vec<NotificationRecord>>>,
}

impl RecordingNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts shown so far.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn toasts(&self) -> Result<Vec<NotificationRecord>> {
        Ok(self.toasts.lock().map_err(|_| lock_failed())?.clone())
    }

    /// Platform notifications raised so far.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn notifications(&self) -> Result<Vec<NotificationRecord>> {
        Ok(self.notifications.lock().map_err(|_| lock_failed())?.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn show_toast(&self, record: &NotificationRecord) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(record.clone());
        }
    }

    fn show_notification(&self, record: &NotificationRecord) -> Result<()> {
        self.notifications
            .lock()
            .map_err(|_| lock_failed())?
            .push(record.clone());
        Ok(())
    }
}

/// Navigator that records requested routes.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    routes: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl RecordingNavigator {
    /// Create a navigator that opens every route.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a navigator that fails every navigation.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Routes requested so far, including failed ones.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn routes(&self) -> Result<Vec<String>> {
        Ok(self.routes.lock().map_err(|_| lock_failed())?.clone())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) -> Result<()> {
        self.routes
            .lock()
            .map_err(|_| lock_failed())?
            .push(route.to_string());

        if self.failing {
            return Err(PushError::NavigationFailed(format!("cannot open {route}")));
        }
        Ok(())
    }
}
