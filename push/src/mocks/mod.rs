//! Mock provider implementations for testing.
//!
//! In-memory stand-ins for the platform push service, the registration
//! backend and the display and navigation collaborators. All mocks are
//! `Clone` and share their recorded state between clones.

pub mod backend;
pub mod display;
pub mod provider;

pub use backend::MockRegistrationBackend;
pub use display::{RecordingNavigator, RecordingNotifier};
pub use provider::MockPushProvider;
