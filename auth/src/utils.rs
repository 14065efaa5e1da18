//! Encoding helpers shared by the token and PKCE code.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Base64url engine that emits no padding and accepts input with or without `=`.
///
/// Token segments and JWT parts are produced by different encoders upstream,
/// some of which pad.
pub const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode a base64url segment, tolerating padding.
///
/// # Errors
///
/// Returns the underlying [`base64::DecodeError`] on invalid input.
///
/// # Examples
///
/// ```
/// use portal_auth::utils::decode_base64url;
///
/// assert_eq!(decode_base64url("aGk").unwrap(), b"hi");
/// assert_eq!(decode_base64url("aGk=").unwrap(), b"hi");
/// assert!(decode_base64url("a").is_err());
/// ```
pub fn decode_base64url(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT.decode(segment)
}

/// Strip an optional `Bearer ` prefix and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use portal_auth::utils::strip_bearer;
///
/// assert_eq!(strip_bearer("Bearer abc"), "abc");
/// assert_eq!(strip_bearer("  abc "), "abc");
/// ```
#[must_use]
pub fn strip_bearer(token: &str) -> &str {
    let trimmed = token.trim();
    trimmed
        .strip_prefix(crate::constants::BEARER_PREFIX)
        .map_or(trimmed, str::trim)
}
