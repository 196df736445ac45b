//! Display-only decoding of JWT-shaped session tokens.
//!
//! Nothing here verifies a signature, an issuer, or an expiry. The decoded
//! claims describe what the token *says*, not what the holder is allowed to
//! do. Use them to label a UI, never to decide whether an action may run.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Claims read from a token payload without any verification.
#[derive(Debug, Clone, PartialEq)]
pub struct UnverifiedClaims {
    claims: Map<String, Value>,
}

impl UnverifiedClaims {
    /// Raw claim lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_claim("name")
    }

    pub fn email(&self) -> Option<&str> {
        self.str_claim("email")
    }

    /// The `exp` claim as a timestamp, if present and numeric.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.claims.get("exp")?.as_i64()?;
        DateTime::<Utc>::from_timestamp(secs, 0)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.claims
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }
}

/// Decode the payload segment of a `header.payload.signature` token.
///
/// Total over all inputs: anything malformed yields `None`.
pub fn decode_claims(token: &str) -> Option<UnverifiedClaims> {
    let mut parts = token.trim().split('.');
    let _header = parts.next()?;
    let payload = parts.next()?.trim_end_matches('=');
    if payload.is_empty() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(claims) => Some(UnverifiedClaims { claims }),
        _ => None,
    }
}
