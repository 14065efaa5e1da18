//! Token fixtures.
//!
//! The production code only decrypts. These helpers encrypt with the same
//! documented scheme so tests can round-trip through the real decrypt path:
//!
//! - salt: lowercase hex SHA-256 of the secret (64 ASCII bytes)
//! - key: PBKDF2-HMAC-SHA256, 100 000 iterations, 32 bytes
//! - cipher: AES-256-GCM, 128-bit tag
//! - wire format: `base64url(iv):base64url(tag):base64url(ciphertext)`

#![allow(clippy::expect_used, clippy::panic)] // Fixture helpers fail loudly on impossible states

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{Aes256Gcm, AesGcm, Nonce};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// PBKDF2 iteration count of the token scheme.
pub const FIXTURE_PBKDF2_ITERATIONS: u32 = 100_000;

const TAG_LEN: usize = 16;

fn derive_key(secret: &str) -> [u8; 32] {
    let salt = format!("{:x}", Sha256::digest(secret.as_bytes()));
    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(
        secret.as_bytes(),
        salt.as_bytes(),
        FIXTURE_PBKDF2_ITERATIONS,
        &mut key,
    );
    key
}

/// Encrypt `plaintext` into an `iv:tag:ciphertext` token with a random 12-byte IV.
#[must_use]
pub fn encrypt_token(plaintext: &str, secret: &str) -> String {
    let mut iv = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut iv);
    encrypt_token_with_iv(plaintext, secret, &iv)
}

/// Encrypt with an explicit IV (12 or 16 bytes).
///
/// # Panics
///
/// Panics on any other IV length.
#[must_use]
pub fn encrypt_token_with_iv(plaintext: &str, secret: &str, iv: &[u8]) -> String {
    let key = derive_key(secret);

    let sealed = match iv.len() {
        12 => Aes256Gcm::new_from_slice(&key)
            .expect("32-byte key")
            .encrypt(Nonce::from_slice(iv), plaintext.as_bytes()),
        16 => AesGcm::<Aes256, U16>::new_from_slice(&key)
            .expect("32-byte key")
            .encrypt(Nonce::<U16>::from_slice(iv), plaintext.as_bytes()),
        other => panic!("fixture IV must be 12 or 16 bytes, got {other}"),
    }
    .expect("AES-GCM encryption does not fail for in-memory input");

    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    format!(
        "{}:{}:{}",
        URL_SAFE_NO_PAD.encode(iv),
        URL_SAFE_NO_PAD.encode(tag),
        URL_SAFE_NO_PAD.encode(ciphertext)
    )
}

/// Build an unsigned JWT (`header.payload.signature`) around `claims`.
///
/// The signature segment is filler; clients never verify it.
#[must_use]
pub fn unsigned_jwt(claims: &serde_json::Value) -> String {
    let header = serde_json::json!({ "alg": "RS256", "typ": "JWT" });
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"fixture-signature")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_has_three_segments() {
        let token = encrypt_token("payload", "secret");
        let parts: Vec<&str> = token.split(':').collect();
        assert_eq!(parts.len(), 3);

        let tag = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        assert_eq!(tag.len(), TAG_LEN);

        // GCM is a stream mode: ciphertext length equals plaintext length
        let ciphertext = URL_SAFE_NO_PAD.decode(parts[2]).unwrap();
        assert_eq!(ciphertext.len(), "payload".len());
    }

    #[test]
    fn test_fixed_iv_is_deterministic() {
        let iv = [7u8; 16];
        assert_eq!(
            encrypt_token_with_iv("x", "s", &iv),
            encrypt_token_with_iv("x", "s", &iv)
        );
    }

    #[test]
    fn test_unsigned_jwt_payload_segment() {
        let jwt = unsigned_jwt(&serde_json::json!({ "sub": "abc" }));
        let payload = jwt.split('.').nth(1).unwrap();
        let decoded: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(decoded["sub"], "abc");
    }
}
