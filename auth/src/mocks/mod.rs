//! Mock provider implementations for testing.
//!
//! Simple in-memory implementations of the provider traits for unit and
//! integration tests.

pub mod exchange;
pub mod storage;

pub use exchange::{ExchangeCall, MockTokenExchange};
pub use storage::FailingStorage;
