//! PKCE (Proof Key for Code Exchange) verifier and challenge generation.
//!
//! The verifier is 32 bytes from the operating system CSPRNG, base64url
//! encoded without padding (43 characters). The challenge is the `S256`
//! transform: `base64url(SHA-256(verifier))`, again without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes in a verifier.
pub const VERIFIER_BYTES: usize = 32;

/// The only challenge method this client sends.
pub const CHALLENGE_METHOD: &str = "S256";

/// A PKCE verifier and its derived challenge.
///
/// The verifier must be persisted by the caller before redirecting away and
/// discarded after the code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Secret verifier kept on the client.
    pub verifier: String,
    /// Public challenge sent with the authorization request.
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair.
    ///
    /// # Examples
    ///
    /// ```
    /// use portal_auth::pkce::PkcePair;
    ///
    /// let pair = PkcePair::generate();
    /// assert_eq!(pair.verifier.len(), 43);
    /// assert_eq!(pair.challenge, PkcePair::challenge_for(&pair.verifier));
    /// ```
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; VERIFIER_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self::from_verifier(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Build a pair around an existing verifier.
    #[must_use]
    pub fn from_verifier(verifier: String) -> Self {
        let challenge = Self::challenge_for(&verifier);
        Self {
            verifier,
            challenge,
        }
    }

    /// Compute the `S256` challenge for `verifier`.
    #[must_use]
    pub fn challenge_for(verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
    }
}

impl std::fmt::Debug for PkcePair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkcePair")
            .field("verifier", &"<redacted>")
            .field("challenge", &self.challenge)
            .finish()
    }
}
