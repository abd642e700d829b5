//! Error types for the authentication session core.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Configuration failures detected while loading [`Auth0Config`](crate::config::Auth0Config).
///
/// These are fatal: the surrounding application must refuse to start
/// rather than run with a partial configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("{0} is required")]
    Missing(&'static str),

    /// An environment variable is present but cannot be parsed.
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Error taxonomy for the session core.
///
/// Cookie integrity failures are deliberately absent: a forged or corrupted
/// cookie is reported as "no session" (`None`), never as an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthError {
    // ═══════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════

    /// Process configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A database-connection endpoint was called without `AUTH0_DB_CONNECTION`.
    #[error("AUTH0_DB_CONNECTION is required for {operation}")]
    DbConnectionRequired {
        /// Operation that needed the connection (e.g. "user registration")
        operation: &'static str,
    },

    // ═══════════════════════════════════════════════════════════
    // Login Flow Errors
    // ═══════════════════════════════════════════════════════════

    /// OAuth state parameter does not match the login attempt (CSRF protection).
    #[error("Invalid OAuth state parameter")]
    OAuthStateInvalid,

    /// No valid PKCE cookie accompanied the callback (expired, forged or absent).
    #[error("Login attempt not found or expired")]
    LoginAttemptNotFound,

    // ═══════════════════════════════════════════════════════════
    // Identity Provider Errors
    // ═══════════════════════════════════════════════════════════

    /// The identity provider answered with a non-2xx status.
    ///
    /// `message` is the provider's human-readable description.
    #[error("{message}")]
    ProviderRejected {
        /// HTTP status code returned by the provider
        status: u16,
        /// Provider error description
        message: String,
    },

    /// The identity provider did not answer within the configured timeout.
    #[error("Identity provider did not respond within {0:?}")]
    ProviderTimeout(Duration),

    /// The request never produced a response (DNS, TLS, connection reset).
    #[error("Identity provider request failed: {0}")]
    ProviderUnavailable(String),

    /// The provider answered 2xx with a body we could not decode.
    #[error("Invalid identity provider response: {0}")]
    InvalidProviderResponse(String),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Cookie payload could not be serialized.
    #[error("Failed to encode cookie: {0}")]
    CookieEncodingFailed(String),

    /// A redirect URL could not be built.
    #[error("Failed to build URL: {0}")]
    UrlBuildFailed(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClientInit(String),
}

impl AuthError {
    /// Returns `true` if this error is caused by the end user's input or browser state.
    ///
    /// # Examples
    ///
    /// ```
    /// # use empresor_auth::AuthError;
    /// assert!(AuthError::OAuthStateInvalid.is_user_error());
    /// assert!(!AuthError::ProviderUnavailable("reset".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::OAuthStateInvalid
                | Self::LoginAttemptNotFound
                | Self::ProviderRejected { .. }
        )
    }

    /// Returns `true` if this error indicates a possible attack.
    ///
    /// # Examples
    ///
    /// ```
    /// # use empresor_auth::AuthError;
    /// assert!(AuthError::OAuthStateInvalid.is_security_issue());
    /// assert!(!AuthError::LoginAttemptNotFound.is_security_issue());
    /// ```
    #[must_use]
    pub const fn is_security_issue(&self) -> bool {
        matches!(self, Self::OAuthStateInvalid)
    }

    /// Returns `true` if the provider may succeed when called again later.
    ///
    /// The core never retries; this only informs the caller's policy.
    ///
    /// # Examples
    ///
    /// ```
    /// # use empresor_auth::AuthError;
    /// # use std::time::Duration;
    /// assert!(AuthError::ProviderTimeout(Duration::from_secs(10)).is_transient());
    /// assert!(!AuthError::OAuthStateInvalid.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::ProviderTimeout(_) | Self::ProviderUnavailable(_) => true,
            Self::ProviderRejected { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
