//! Session state types.
//!
//! Sessions live entirely inside the signed `empresor_auth` cookie; there is
//! no server-side session store. JSON field names are camelCase so cookie
//! values stay readable by every deployment of the app.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decoded id_token claims.
pub type Claims = serde_json::Map<String, serde_json::Value>;

/// Body of a successful `/oauth/token` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Access token for API requests.
    pub access_token: String,

    /// OIDC id_token (JWT), present with the `openid` scope.
    #[serde(default)]
    pub id_token: Option<String>,

    /// Refresh token, present with `offline_access`.
    ///
    /// Refresh responses may omit it when rotation is disabled.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Token type (always "Bearer").
    #[serde(default)]
    pub token_type: String,

    /// Granted scopes (space-delimited).
    #[serde(default)]
    pub scope: Option<String>,
}

/// Authenticated session carried by the session cookie.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Access token for API requests.
    pub access_token: String,

    /// OIDC id_token with the user's profile claims.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Refresh token; without one the session cannot be renewed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiry in epoch milliseconds.
    pub expires_at: i64,
}

impl StoredSession {
    /// Build a session from a token response received at `now`.
    ///
    /// `expires_at` is always derived from the provider's `expires_in`.
    /// An empty `refresh_token` is treated as absent.
    #[must_use]
    pub fn from_tokens(tokens: &TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            id_token: tokens.id_token.clone().filter(|t| !t.is_empty()),
            refresh_token: tokens.refresh_token.clone().filter(|t| !t.is_empty()),
            expires_at: now
                .timestamp_millis()
                .saturating_add(tokens.expires_in.saturating_mul(1000)),
        }
    }

    /// Whether the session should be renewed at `now`.
    ///
    /// True iff fewer than `threshold_secs` seconds remain. A session with
    /// exactly `threshold_secs` left is not yet due.
    #[must_use]
    pub fn should_refresh(&self, threshold_secs: i64, now: DateTime<Utc>) -> bool {
        self.expires_at - now.timestamp_millis() < threshold_secs.saturating_mul(1000)
    }

    /// Whether the session carries a usable refresh token.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Whole seconds left until expiry, clamped at zero.
    #[must_use]
    pub fn max_age_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now.timestamp_millis()).div_euclid(1000).max(0)
    }

    /// Expiry as a timestamp, if representable.
    #[must_use]
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expires_at)
    }

    /// Profile claims from the session's id_token.
    ///
    /// The token signature is not checked; it came from the provider over
    /// TLS and has been inside our own signed cookie since.
    #[must_use]
    pub fn user_claims(&self) -> Option<Claims> {
        self.id_token.as_deref().and_then(decode_id_token)
    }
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("access_token", &"[REDACTED]")
            .field("has_id_token", &self.id_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Transient state of one login attempt, carried by the PKCE cookie.
///
/// Consumed exactly once by the callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PkceSessionData {
    /// PKCE code verifier matching the challenge sent to `/authorize`.
    pub code_verifier: String,

    /// Anti-CSRF state sent to `/authorize`.
    pub state: String,

    /// Where to send the user after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_to: Option<String>,

    /// Auth0 `screen_hint` (e.g. "signup").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_hint: Option<String>,
}

/// Decode the payload segment of a JWT without verifying it.
///
/// Returns `None` (and logs) for tokens that are not `header.payload[.sig]`
/// with a base64url JSON object payload.
#[must_use]
pub fn decode_id_token(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload)) = (segments.next(), segments.next()) else {
        return None;
    };

    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to decode id_token payload: {e}");
            return None;
        }
    };

    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::warn!("Failed to parse id_token payload: {e}");
            None
        }
    }
}
