//! `Set-Cookie` construction for the session and PKCE cookies.
//!
//! Both cookies are `HttpOnly; SameSite=Lax` on path `/`, with `Secure`
//! added when the deployment serves HTTPS. The session cookie's `Max-Age`
//! tracks the access token's remaining lifetime; the PKCE cookie always
//! lives 900 seconds.

use crate::codec::CookieCodec;
use crate::config::Auth0Config;
use crate::constants::cookies::{AUTH_COOKIE_NAME, PKCE_COOKIE_MAX_AGE_SECS, PKCE_COOKIE_NAME};
use crate::error::Result;
use crate::session::{PkceSessionData, StoredSession};
use chrono::{DateTime, Utc};

/// Builds and reads the auth cookies.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    codec: CookieCodec,
    secure: bool,
}

impl SessionCookies {
    /// Create a cookie jar signing with `codec`.
    #[must_use]
    pub const fn new(codec: CookieCodec, secure: bool) -> Self {
        Self { codec, secure }
    }

    /// Cookie jar keyed by `config.cookie_secret`.
    #[must_use]
    pub fn from_config(config: &Auth0Config) -> Self {
        Self::new(
            CookieCodec::new(&config.cookie_secret),
            config.secure_cookies,
        )
    }

    /// The codec used for signatures.
    #[must_use]
    pub const fn codec(&self) -> &CookieCodec {
        &self.codec
    }

    /// `Set-Cookie` value storing `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized.
    pub fn session_cookie(&self, session: &StoredSession, now: DateTime<Utc>) -> Result<String> {
        let value = self.codec.sign(session)?;
        Ok(format!(
            "{AUTH_COOKIE_NAME}={value}; {}",
            self.attributes(session.max_age_secs(now))
        ))
    }

    /// `Set-Cookie` value storing one login attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the data cannot be serialized.
    pub fn pkce_cookie(&self, data: &PkceSessionData) -> Result<String> {
        let value = self.codec.sign(data)?;
        Ok(format!(
            "{PKCE_COOKIE_NAME}={value}; {}",
            self.attributes(PKCE_COOKIE_MAX_AGE_SECS)
        ))
    }

    /// `Set-Cookie` value deleting cookie `name`.
    #[must_use]
    pub fn clear_cookie(&self, name: &str) -> String {
        format!("{name}=; {}", self.attributes(0))
    }

    /// Verify and decode a session cookie value.
    #[must_use]
    pub fn read_session(&self, value: Option<&str>) -> Option<StoredSession> {
        value
            .filter(|v| !v.is_empty())
            .and_then(|v| self.codec.verify(v))
    }

    /// Verify and decode a PKCE cookie value.
    #[must_use]
    pub fn read_pkce_session(&self, value: Option<&str>) -> Option<PkceSessionData> {
        value
            .filter(|v| !v.is_empty())
            .and_then(|v| self.codec.verify(v))
    }

    fn attributes(&self, max_age: i64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!("Path=/; HttpOnly{secure}; SameSite=Lax; Max-Age={max_age}")
    }
}

/// Find cookie `name` in a `Cookie` request header.
///
/// # Examples
///
/// ```
/// use empresor_auth::cookies::cookie_value;
///
/// let header = "theme=dark; empresor_auth=abc.def";
/// assert_eq!(cookie_value(header, "empresor_auth"), Some("abc.def"));
/// assert_eq!(cookie_value(header, "empresor_pkce"), None);
/// ```
#[must_use]
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"'))
}
