//! Authentication providers.
//!
//! Traits for the external collaborators of the auth core: durable
//! key-value storage and the backend code exchange. Concrete
//! implementations live in [`crate::stores`] and [`http_exchange`]; mocks
//! live in `crate::mocks` behind the `test-utils` feature.

pub mod exchange;
pub mod http_exchange;
pub mod storage;

pub use exchange::{ExchangeResponse, TokenExchange};
pub use http_exchange::HttpTokenExchange;
pub use storage::KeyValueStore;
