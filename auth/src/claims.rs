//! Identity claims decoded from a JWT payload.
//!
//! Only the payload segment is decoded. Signatures are not verified on the
//! client; the backend verifies every token it receives.

use crate::error::{AuthError, Result};
use crate::utils::decode_base64url;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON object payload of a JWT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Decode the payload segment of `jwt`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedJwt`] if the token has no payload
    /// segment, the segment is not base64url, or it is not a JSON object.
    pub fn from_jwt(jwt: &str) -> Result<Self> {
        let mut parts = jwt.split('.');
        let payload = match (parts.next(), parts.next()) {
            (Some(header), Some(payload)) if !header.is_empty() && !payload.is_empty() => payload,
            _ => return Err(AuthError::MalformedJwt("missing payload segment".to_string())),
        };

        let bytes = decode_base64url(payload)
            .map_err(|e| AuthError::MalformedJwt(format!("payload is not base64url: {e}")))?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(AuthError::MalformedJwt("payload is not a JSON object".to_string())),
            Err(e) => Err(AuthError::MalformedJwt(format!("payload is not JSON: {e}"))),
        }
    }

    /// Raw claim value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Claim value if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Subject (`sub`).
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// Directory object id (`oid`).
    #[must_use]
    pub fn object_id(&self) -> Option<&str> {
        self.get_str("oid")
    }

    /// Identifier used for backend bindings: `oid`, falling back to `sub`.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.object_id().or_else(|| self.subject())
    }

    /// Display name (`name`).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    /// First entry of `emails`, falling back to `email`.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get("emails")
            .and_then(Value::as_array)
            .and_then(|emails| emails.first())
            .and_then(Value::as_str)
            .or_else(|| self.get_str("email"))
    }

    /// Tenant id: `extension_TenantId`, falling back to `tid`.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.get_str("extension_TenantId")
            .or_else(|| self.get_str("tid"))
    }

    /// Expiry (`exp`).
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("exp")
    }

    /// Issue time (`iat`).
    #[must_use]
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp("iat")
    }

    /// Returns `true` if `exp` is present and not after `now`.
    ///
    /// Informational only. Expiry is enforced by the backend.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp <= now)
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name)
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use portal_testing::fixtures::unsigned_jwt;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        Claims::from_jwt(&unsigned_jwt(&value)).unwrap()
    }

    #[test]
    fn test_decodes_b2c_payload() {
        let c = claims(json!({
            "sub": "sub-1",
            "oid": "oid-1",
            "name": "Ada",
            "emails": ["ada@example.com"],
            "extension_TenantId": "tenant-7",
            "exp": 1_735_693_200,
            "iat": 1_735_689_600
        }));

        assert_eq!(c.user_id(), Some("oid-1"));
        assert_eq!(c.subject(), Some("sub-1"));
        assert_eq!(c.name(), Some("Ada"));
        assert_eq!(c.email(), Some("ada@example.com"));
        assert_eq!(c.tenant_id(), Some("tenant-7"));
        assert_eq!(c.expires_at().unwrap().to_rfc3339(), "2025-01-01T01:00:00+00:00");
        assert_eq!(c.issued_at().unwrap().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fallbacks() {
        let c = claims(json!({ "sub": "sub-1", "email": "b@example.com", "tid": "t-1" }));
        assert_eq!(c.user_id(), Some("sub-1"));
        assert_eq!(c.email(), Some("b@example.com"));
        assert_eq!(c.tenant_id(), Some("t-1"));
        assert_eq!(c.expires_at(), None);
    }

    #[test]
    fn test_expiry_check() {
        let c = claims(json!({ "exp": 100 }));
        assert!(c.is_expired_at(DateTime::from_timestamp(100, 0).unwrap()));
        assert!(!c.is_expired_at(DateTime::from_timestamp(99, 0).unwrap()));
        assert!(!claims(json!({})).is_expired_at(Utc::now()));
    }

    #[test]
    fn test_padded_payload_accepted() {
        let jwt = unsigned_jwt(&json!({ "sub": "x" }));
        let mut parts: Vec<String> = jwt.split('.').map(str::to_string).collect();
        let pad = (4 - parts[1].len() % 4) % 4;
        parts[1].push_str(&"=".repeat(pad));
        assert_eq!(Claims::from_jwt(&parts.join(".")).unwrap().subject(), Some("x"));
    }

    #[test]
    fn test_malformed_tokens() {
        for jwt in ["", "no-dots", "header.", "header.!!!.sig", "header.bm90LWpzb24.sig", "header.WzFd.sig"] {
            assert!(
                matches!(Claims::from_jwt(jwt), Err(AuthError::MalformedJwt(_))),
                "expected MalformedJwt for {jwt:?}"
            );
        }
    }
}
