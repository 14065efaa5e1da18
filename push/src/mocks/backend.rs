//! Mock registration backend for testing.

use crate::error::{PushError, Result};
use crate::providers::RegistrationBackend;
use crate::registration::PushBinding;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock registration backend.
///
/// Records every binding it receives, accepted or not.
#[derive(Debug, Clone, Default)]
pub struct MockRegistrationBackend {
    bindings: Arc<Mutex<Vec<PushBinding>>>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockRegistrationBackend {
    /// Create a backend that accepts every binding.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that rejects every binding.
    #[must_use]
    pub fn failing() -> Self {
        let backend = Self::new();
        backend.set_failing(true);
        backend
    }

    /// Delay every response.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Switch between accepting and rejecting.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Bindings received so far.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn bindings(&self) -> Result<Vec<PushBinding>> {
        Ok(self
            .bindings
            .lock()
            .map_err(|_| PushError::RegistrationFailed("Mutex lock failed".to_string()))?
            .clone())
    }
}

impl RegistrationBackend for MockRegistrationBackend {
    fn register(&self, binding: &PushBinding) -> impl Future<Output = Result<()>> + Send {
        let bindings = Arc::clone(&self.bindings);
        let failing = self.failing.load(Ordering::SeqCst);
        let delay = self.delay;
        let binding = binding.clone();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            bindings
                .lock()
                .map_err(|_| PushError::RegistrationFailed("Mutex lock failed".to_string()))?
                .push(binding);

            if failing {
                return Err(PushError::RegistrationFailed("HTTP 500".to_string()));
            }
            Ok(())
        }
    }
}
