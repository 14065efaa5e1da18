//! # Portal Auth
//!
//! Client-side authentication core of the member portal.
//!
//! ## Components
//!
//! - **PKCE** ([`pkce`]): verifier/challenge pairs for the authorization code flow
//! - **Token cipher** ([`cipher`]): decrypts `iv:tag:ciphertext` bearer tokens
//!   with a PBKDF2-derived AES-256-GCM key
//! - **Credential store** ([`credentials`]): token, user and PKCE verifier in
//!   durable key-value storage ([`stores`])
//! - **Session decoder** ([`session`]): stored token → [`SessionResolution`]
//! - **B2C authorization** ([`b2c`]): redirect URL and code exchange
//!
//! ## Flow
//!
//! ```text
//! B2cAuthorization::begin → redirect → B2cAuthorization::complete
//!     → CredentialStore::save → SessionDecoder::resolve_identity (on demand)
//! ```
//!
//! ## Example: Resolving the Session
//!
//! ```rust
//! use portal_auth::{AuthConfig, CredentialStore, SessionDecoder, SessionResolution};
//! use portal_auth::stores::MemoryStorage;
//!
//! # async fn example() -> portal_auth::Result<()> {
//! let credentials = CredentialStore::new(MemoryStorage::new());
//! let decoder = SessionDecoder::new(credentials, AuthConfig::from_env());
//!
//! match decoder.resolve_identity().await? {
//!     SessionResolution::Valid(claims) => println!("signed in as {:?}", claims.user_id()),
//!     SessionResolution::Absent | SessionResolution::Invalid(_) => println!("send to login"),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod b2c;
pub mod cipher;
pub mod claims;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod pkce;
pub mod providers;
pub mod session;
pub mod stores;
pub mod utils;

// Mock implementations (available in tests and with test-utils feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// Re-export main types for convenience
pub use b2c::{AuthorizationRequest, B2cAuthorization};
pub use cipher::TokenCipher;
pub use claims::Claims;
pub use config::{AuthConfig, B2cConfig};
pub use credentials::{CredentialStore, StoredCredentials};
pub use error::{AuthError, Result};
pub use pkce::PkcePair;
pub use providers::{KeyValueStore, TokenExchange};
pub use session::{SessionDecoder, SessionResolution};
