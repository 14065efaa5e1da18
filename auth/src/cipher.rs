//! Encrypted bearer token decryption.
//!
//! # Wire Format
//!
//! ```text
//! base64url(iv) ":" base64url(tag) ":" base64url(ciphertext)
//! ```
//!
//! - IV: 12 or 16 bytes
//! - tag: 16 bytes (128-bit GCM tag)
//! - ciphertext: same length as the plaintext
//!
//! # Key Derivation
//!
//! ```text
//! salt = hex(SHA-256(secret))            // 64 lowercase ASCII bytes
//! key  = PBKDF2-HMAC-SHA256(secret, salt, 100_000, 32 bytes)
//! ```
//!
//! The key is only ever used to decrypt. Derivation is deliberately slow, so
//! [`TokenCipher`] keeps the derived key and callers should reuse it.

use crate::constants::token_cipher::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN, SEPARATOR, TAG_LEN};
use crate::error::{AuthError, Result};
use crate::utils::decode_base64url;
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{Aes256Gcm, AesGcm, Key, Nonce};
use sha2::{Digest, Sha256};

/// AES-256-GCM with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Returns `true` if `token` is in the encrypted wire format.
///
/// Plaintext JWTs never contain `:`; encrypted tokens always do.
///
/// # Examples
///
/// ```
/// use portal_auth::cipher::is_encrypted;
///
/// assert!(is_encrypted("aXY:dGFn:Y3Q"));
/// assert!(!is_encrypted("eyJhbGciOiJIUzI1NiJ9.e30.sig"));
/// ```
#[must_use]
pub fn is_encrypted(token: &str) -> bool {
    token.contains(SEPARATOR)
}

/// Decrypt `encrypted_token` with a key derived from `secret`.
///
/// Derives the key on every call; prefer [`TokenCipher`] when decrypting more
/// than once.
///
/// # Errors
///
/// - [`AuthError::MissingSecret`] if `secret` is empty (checked first)
/// - [`AuthError::InvalidFormat`] unless the token has exactly three segments
/// - [`AuthError::DecryptionFailed`] on bad encoding, IV or tag length, tag
///   mismatch, or non-UTF-8 plaintext
pub fn decrypt(encrypted_token: &str, secret: &str) -> Result<String> {
    TokenCipher::new(secret)?.decrypt(encrypted_token)
}

/// A decrypt-only AES-256-GCM key derived from the shared token secret.
#[derive(Clone)]
pub struct TokenCipher {
    key: Key<Aes256Gcm>,
}

impl TokenCipher {
    /// Derive the key for `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingSecret`] if `secret` is empty.
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let digest = format!("{:x}", Sha256::digest(secret.as_bytes()));
        let salt = &digest.as_bytes()[..SALT_LEN.min(digest.len())];

        let mut key = [0u8; KEY_LEN];
        pbkdf2::pbkdf2_hmac::<Sha256>(secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);

        Ok(Self {
            key: Key::<Aes256Gcm>::from(key),
        })
    }

    /// Decrypt a token in `iv:tag:ciphertext` form.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidFormat`] unless the token has exactly three segments
    /// - [`AuthError::DecryptionFailed`] on bad encoding, IV or tag length, tag
    ///   mismatch, or non-UTF-8 plaintext
    pub fn decrypt(&self, encrypted_token: &str) -> Result<String> {
        let segments: Vec<&str> = encrypted_token.split(SEPARATOR).collect();
        let [iv, tag, ciphertext] = segments.as_slice() else {
            return Err(AuthError::InvalidFormat {
                segments: segments.len(),
            });
        };

        let iv = decode_segment("iv", iv)?;
        let tag = decode_segment("tag", tag)?;
        let mut sealed = decode_segment("ciphertext", ciphertext)?;

        if tag.len() != TAG_LEN {
            return Err(AuthError::DecryptionFailed(format!(
                "authentication tag must be {TAG_LEN} bytes, got {}",
                tag.len()
            )));
        }

        // AES-GCM expects the tag appended to the ciphertext
        sealed.extend_from_slice(&tag);

        let plaintext = match iv.len() {
            12 => Aes256Gcm::new(&self.key).decrypt(Nonce::<U12>::from_slice(&iv), sealed.as_slice()),
            16 => Aes256Gcm16::new(&self.key).decrypt(Nonce::<U16>::from_slice(&iv), sealed.as_slice()),
            other => {
                return Err(AuthError::DecryptionFailed(format!(
                    "IV must be 12 or 16 bytes, got {other}"
                )));
            },
        }
        .map_err(|_| AuthError::DecryptionFailed("authentication tag mismatch".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| AuthError::DecryptionFailed(format!("plaintext is not UTF-8: {e}")))
    }
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").field("key", &"<redacted>").finish()
    }
}

fn decode_segment(name: &str, segment: &str) -> Result<Vec<u8>> {
    decode_base64url(segment)
        .map_err(|e| AuthError::DecryptionFailed(format!("invalid base64url in {name} segment: {e}")))
}
