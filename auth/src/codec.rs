//! Tamper-evident cookie codec.
//!
//! A cookie value has the form `<body>.<signature>` where
//!
//! - `body` is the base64url (unpadded) encoding of the payload's JSON, and
//! - `signature` is the base64url encoding of HMAC-SHA256 computed over the
//!   encoded `body` string, keyed by the raw bytes of the cookie secret.
//!
//! Verification never fails loudly. A missing separator, a bad signature,
//! invalid base64 or a body that is not the expected JSON all produce `None`,
//! so a forged cookie degrades to "not logged in" instead of an error.

use crate::error::{AuthError, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies cookie payloads with a shared secret.
///
/// Cheap to clone; the key bytes are reference counted.
#[derive(Clone)]
pub struct CookieCodec {
    key: Arc<[u8]>,
}

impl CookieCodec {
    /// Create a codec keyed by `secret`.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: Arc::from(secret.as_ref()),
        }
    }

    /// Serialize and sign `payload`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::CookieEncodingFailed`] if the payload cannot be
    /// serialized to JSON.
    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String> {
        let json = serde_json::to_vec(payload)
            .map_err(|e| AuthError::CookieEncodingFailed(e.to_string()))?;
        let body = URL_SAFE_NO_PAD.encode(json);
        let signature = self.signature(&body)?;
        Ok(format!("{body}.{signature}"))
    }

    /// Verify `value` and decode its payload.
    ///
    /// Returns `None` for any malformed, forged or undecodable value.
    #[must_use]
    pub fn verify<T: DeserializeOwned>(&self, value: &str) -> Option<T> {
        let (body, signature) = value.split_once('.')?;
        if body.is_empty() || signature.is_empty() {
            return None;
        }

        let expected = self.signature(body).ok()?;
        if !constant_time_eq::constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            tracing::warn!("Rejected cookie with invalid signature");
            return None;
        }

        let json = match URL_SAFE_NO_PAD.decode(body) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to decode signed cookie body: {e}");
                return None;
            }
        };

        match serde_json::from_slice(&json) {
            Ok(payload) => Some(payload),
            Err(e) => {
                tracing::warn!("Failed to parse signed cookie payload: {e}");
                None
            }
        }
    }

    /// base64url(HMAC-SHA256(key, body)).
    fn signature(&self, body: &str) -> Result<String> {
        // HMAC accepts keys of any length; the error arm is unreachable in practice.
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AuthError::CookieEncodingFailed(e.to_string()))?;
        mac.update(body.as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }
}

impl fmt::Debug for CookieCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieCodec")
            .field("key_length", &self.key.len())
            .finish_non_exhaustive()
    }
}
