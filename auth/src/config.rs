//! Auth0 configuration.
//!
//! [`Auth0Config`] is built once at process start (usually with
//! [`Auth0Config::from_env`]) and shared by reference afterwards. Nothing in
//! this crate reads the environment after startup.

use crate::error::ConfigError;
use std::fmt;
use std::time::Duration;

/// Environment variable names.
pub mod env {
    /// Auth0 tenant domain (e.g. `empresor.us.auth0.com`).
    pub const DOMAIN: &str = "AUTH0_DOMAIN";
    /// Application client ID.
    pub const CLIENT_ID: &str = "AUTH0_CLIENT_ID";
    /// Application client secret.
    pub const CLIENT_SECRET: &str = "AUTH0_CLIENT_SECRET";
    /// API audience (optional).
    pub const AUDIENCE: &str = "AUTH0_AUDIENCE";
    /// OAuth callback URL registered with Auth0.
    pub const REDIRECT_URI: &str = "AUTH0_REDIRECT_URI";
    /// Where Auth0 sends the browser after logout.
    pub const POST_LOGOUT_REDIRECT_URI: &str = "AUTH0_POST_LOGOUT_REDIRECT_URI";
    /// Database connection name for signup and password reset (optional).
    pub const DB_CONNECTION: &str = "AUTH0_DB_CONNECTION";
    /// HMAC key for session and PKCE cookies.
    pub const COOKIE_SECRET: &str = "AUTH0_COOKIE_SECRET";
    /// Provider call timeout in seconds (optional, default 10).
    pub const HTTP_TIMEOUT_SECS: &str = "AUTH0_HTTP_TIMEOUT_SECS";
    /// Deployment environment; `production` enables `Secure` cookies.
    pub const APP_ENV: &str = "APP_ENV";
}

/// Default timeout for calls to the identity provider.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide Auth0 configuration.
///
/// Immutable after construction. Share it with `Arc<Auth0Config>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Auth0Config {
    /// Auth0 tenant domain, without scheme.
    pub domain: String,

    /// Application client ID.
    pub client_id: String,

    /// Application client secret (keep confidential).
    pub client_secret: String,

    /// API audience to request access tokens for.
    pub audience: Option<String>,

    /// OAuth callback URL.
    pub redirect_uri: String,

    /// Default `returnTo` for logout.
    pub post_logout_redirect_uri: String,

    /// Database connection for signup and password reset.
    pub db_connection: Option<String>,

    /// HMAC key for cookie signatures (keep confidential).
    pub cookie_secret: String,

    /// Add the `Secure` attribute to cookies.
    ///
    /// Default: false (enabled by `APP_ENV=production`)
    pub secure_cookies: bool,

    /// Timeout applied to every identity provider request.
    ///
    /// Default: 10 seconds
    pub http_timeout: Duration,
}

impl Auth0Config {
    /// Create a configuration from the required values.
    ///
    /// Optional values start unset; use the `with_*` builders to add them.
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        post_logout_redirect_uri: impl Into<String>,
        cookie_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            audience: None,
            redirect_uri: redirect_uri.into(),
            post_logout_redirect_uri: post_logout_redirect_uri.into(),
            db_connection: None,
            cookie_secret: cookie_secret.into(),
            secure_cookies: false,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    /// Load configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset or
    /// empty, and [`ConfigError::Invalid`] if `AUTH0_HTTP_TIMEOUT_SECS` is not
    /// a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Same as [`Auth0Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let http_timeout = match optional(env::HTTP_TIMEOUT_SECS) {
            None => DEFAULT_HTTP_TIMEOUT,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: env::HTTP_TIMEOUT_SECS,
                        reason: format!("expected a positive number of seconds, got {raw:?}"),
                    });
                }
            },
        };

        let secure_cookies = optional(env::APP_ENV)
            .is_some_and(|value| value.eq_ignore_ascii_case("production"));

        Ok(Self {
            domain: required(env::DOMAIN)?,
            client_id: required(env::CLIENT_ID)?,
            client_secret: required(env::CLIENT_SECRET)?,
            audience: optional(env::AUDIENCE),
            redirect_uri: required(env::REDIRECT_URI)?,
            post_logout_redirect_uri: required(env::POST_LOGOUT_REDIRECT_URI)?,
            db_connection: optional(env::DB_CONNECTION),
            cookie_secret: required(env::COOKIE_SECRET)?,
            secure_cookies,
            http_timeout,
        })
    }

    /// Set the API audience.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the database connection used for signup and password reset.
    #[must_use]
    pub fn with_db_connection(mut self, connection: impl Into<String>) -> Self {
        self.db_connection = Some(connection.into());
        self
    }

    /// Enable or disable the `Secure` cookie attribute.
    #[must_use]
    pub const fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Set the provider request timeout.
    #[must_use]
    pub const fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// `https://{domain}`, the base for every provider URL.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!("https://{}", self.domain)
    }
}

impl fmt::Debug for Auth0Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth0Config")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("audience", &self.audience)
            .field("redirect_uri", &self.redirect_uri)
            .field("post_logout_redirect_uri", &self.post_logout_redirect_uri)
            .field("db_connection", &self.db_connection)
            .field("cookie_secret", &"[REDACTED]")
            .field("secure_cookies", &self.secure_cookies)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}
