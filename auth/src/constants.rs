//! Authentication constants.

/// Durable storage keys.
///
/// These names are shared with the rest of the portal, which reads the same
/// origin-scoped storage.
pub mod storage_keys {
    /// Raw bearer token (plaintext JWT or encrypted token).
    pub const TOKEN: &str = "token";

    /// Serialized user object returned by the login exchange.
    pub const USER: &str = "user";

    /// PKCE verifier kept between the redirect and the code exchange.
    pub const CODE_VERIFIER: &str = "code_verifier";

    /// Stable per-profile device identifier used for push binding.
    pub const DEVICE_ID: &str = "fcmDeviceId";

    /// Last messaging token retrieved from the push provider.
    pub const PUSH_TOKEN: &str = "fcmToken";
}

/// Token cipher parameters.
pub mod token_cipher {
    /// PBKDF2-HMAC-SHA256 iteration count.
    pub const PBKDF2_ITERATIONS: u32 = 100_000;

    /// Derived AES key length in bytes (AES-256).
    pub const KEY_LEN: usize = 32;

    /// Maximum salt length taken from the hex digest of the secret.
    pub const SALT_LEN: usize = 64;

    /// GCM authentication tag length in bytes (128 bits).
    pub const TAG_LEN: usize = 16;

    /// Segment separator of the encrypted token wire format.
    pub const SEPARATOR: char = ':';
}

/// Prefix stripped from stored tokens before decoding.
pub const BEARER_PREFIX: &str = "Bearer ";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_names() {
        assert_eq!(storage_keys::TOKEN, "token");
        assert_eq!(storage_keys::USER, "user");
        assert_eq!(storage_keys::CODE_VERIFIER, "code_verifier");
        assert_eq!(storage_keys::DEVICE_ID, "fcmDeviceId");
        assert_eq!(storage_keys::PUSH_TOKEN, "fcmToken");
    }

    #[test]
    fn test_cipher_parameters() {
        assert_eq!(token_cipher::PBKDF2_ITERATIONS, 100_000);
        assert_eq!(token_cipher::KEY_LEN * 8, 256);
        assert_eq!(token_cipher::TAG_LEN * 8, 128);
    }
}
