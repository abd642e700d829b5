//! Browser login flow.
//!
//! Framework-neutral steps of the redirect dance. Each step returns the URL
//! to redirect to and the `Set-Cookie` values to attach; the HTTP layer only
//! translates them into responses.
//!
//! ```text
//! begin_login ──► Auth0 /authorize ──► complete_login ──► app
//!   (PKCE cookie)                        (session cookie, PKCE cleared)
//! ```

use crate::constants::cookies::{AUTH_COOKIE_NAME, PKCE_COOKIE_NAME};
use crate::constants::oauth::DEFAULT_RETURN_TO;
use crate::error::{AuthError, Result};
use crate::pkce::{PkcePair, generate_state};
use crate::providers::IdentityProvider;
use crate::service::AuthService;
use crate::session::{PkceSessionData, StoredSession};
use crate::urls::{AuthorizeParams, build_authorize_url, build_logout_url};
use constant_time_eq::constant_time_eq;

/// Options for starting a login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    /// Auth0 `screen_hint` (e.g. "signup" to open the registration tab).
    pub screen_hint: Option<String>,

    /// Where to send the user once logged in.
    pub return_to: Option<String>,
}

/// Redirect to the provider's login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    /// `/authorize` URL.
    pub authorize_url: String,

    /// PKCE cookie for this attempt.
    pub set_cookie: String,
}

/// Result of a successful callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCompletion {
    /// The new session.
    pub session: StoredSession,

    /// Where to send the user.
    pub return_to: String,

    /// Session cookie followed by the PKCE clearing cookie.
    pub set_cookies: Vec<String>,
}

/// Redirect to the provider's logout endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoutRedirect {
    /// `/v2/logout` URL.
    pub logout_url: String,

    /// Clearing cookie for the session.
    pub set_cookie: String,
}

/// Outcome of checking a request's session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// No cookie, or one that failed verification.
    Anonymous,

    /// Valid session that does not need refreshing.
    Active(StoredSession),

    /// Session was renewed; the caller must send `set_cookie`.
    Refreshed {
        /// The renewed session.
        session: StoredSession,
        /// Updated session cookie.
        set_cookie: String,
    },

    /// Session was due for refresh and the refresh failed.
    Expired {
        /// Clearing cookie for the session.
        clear_cookie: String,
    },
}

impl SessionStatus {
    /// The usable session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&StoredSession> {
        match self {
            Self::Active(session) | Self::Refreshed { session, .. } => Some(session),
            Self::Anonymous | Self::Expired { .. } => None,
        }
    }

    /// Cookie the response must carry, if any.
    #[must_use]
    pub fn set_cookie(&self) -> Option<&str> {
        match self {
            Self::Refreshed { set_cookie, .. } => Some(set_cookie),
            Self::Expired { clear_cookie } => Some(clear_cookie),
            Self::Anonymous | Self::Active(_) => None,
        }
    }
}

/// Accept `value` as a post-login destination only if it is a path on this
/// origin.
///
/// The path must start with a single `/` (not `//` or `/\`, which browsers
/// read as another host) and contain no control characters.
///
/// # Examples
///
/// ```
/// use empresor_auth::flow::safe_return_to;
///
/// assert_eq!(safe_return_to("/dashboard/quotes?page=2"), Some("/dashboard/quotes?page=2"));
/// assert_eq!(safe_return_to("https://evil.example"), None);
/// assert_eq!(safe_return_to("//evil.example"), None);
/// assert_eq!(safe_return_to("/dashboard\nX"), None);
/// ```
#[must_use]
pub fn safe_return_to(value: &str) -> Option<&str> {
    let rest = value.strip_prefix('/')?;
    if rest.starts_with('/') || rest.starts_with('\\') {
        return None;
    }
    if value.chars().any(char::is_control) {
        return None;
    }
    Some(value)
}

impl<P: IdentityProvider> AuthService<P> {
    /// Start a login: fresh PKCE pair and state, stored in the PKCE cookie.
    ///
    /// # Errors
    ///
    /// Returns an error if the cookie or URL cannot be encoded.
    pub fn begin_login(&self, request: &LoginRequest) -> Result<LoginRedirect> {
        let pkce = PkcePair::generate();
        let state = generate_state();
        let return_to = request.return_to.as_deref().and_then(safe_return_to);

        if return_to.is_none() && request.return_to.as_deref().is_some_and(|r| !r.is_empty()) {
            tracing::warn!("Ignoring unsafe returnTo on login");
        }

        let authorize_url = build_authorize_url(
            self.config(),
            &AuthorizeParams {
                state: &state,
                code_challenge: &pkce.code_challenge,
                screen_hint: request.screen_hint.as_deref(),
                return_to,
            },
        )?;

        let set_cookie = self.cookies().pkce_cookie(&PkceSessionData {
            code_verifier: pkce.code_verifier,
            state,
            return_to: return_to.map(str::to_string),
            screen_hint: request.screen_hint.clone().filter(|s| !s.is_empty()),
        })?;

        tracing::debug!(
            screen_hint = request.screen_hint.as_deref(),
            "Login started"
        );

        Ok(LoginRedirect {
            authorize_url,
            set_cookie,
        })
    }

    /// Finish a login from the callback's `code` and `state`.
    ///
    /// The PKCE cookie is verified and its state compared before the
    /// provider is contacted.
    ///
    /// # Errors
    ///
    /// - [`AuthError::LoginAttemptNotFound`]: PKCE cookie missing, expired or forged
    /// - [`AuthError::OAuthStateInvalid`]: `state` does not match the attempt
    /// - provider errors from the code exchange
    pub async fn complete_login(
        &self,
        code: &str,
        state: &str,
        pkce_cookie: Option<&str>,
    ) -> Result<LoginCompletion> {
        let attempt = self
            .cookies()
            .read_pkce_session(pkce_cookie)
            .ok_or(AuthError::LoginAttemptNotFound)?;

        if !constant_time_eq(attempt.state.as_bytes(), state.as_bytes()) {
            tracing::warn!("OAuth state mismatch on callback");
            return Err(AuthError::OAuthStateInvalid);
        }

        let session = self
            .exchange_code_for_tokens(code, &attempt.code_verifier)
            .await?;

        let set_cookies = vec![
            self.cookies().session_cookie(&session, self.now())?,
            self.cookies().clear_cookie(PKCE_COOKIE_NAME),
        ];

        let return_to = attempt
            .return_to
            .as_deref()
            .and_then(safe_return_to)
            .unwrap_or(DEFAULT_RETURN_TO)
            .to_string();

        tracing::info!("Login completed");

        Ok(LoginCompletion {
            session,
            return_to,
            set_cookies,
        })
    }

    /// Log out: clear the session cookie and leave through the provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the logout URL cannot be built.
    pub fn logout(&self, return_to: Option<&str>) -> Result<LogoutRedirect> {
        Ok(LogoutRedirect {
            logout_url: build_logout_url(self.config(), return_to)?,
            set_cookie: self.cookies().clear_cookie(AUTH_COOKIE_NAME),
        })
    }

    /// Check a session cookie value, refreshing the session when it is due.
    ///
    /// Sessions without a refresh token are returned as they are even when
    /// expired; the provider rejects their access token on use.
    pub async fn authenticate(&self, session_cookie: Option<&str>) -> SessionStatus {
        let Some(session) = self.cookies().read_session(session_cookie) else {
            return SessionStatus::Anonymous;
        };

        let due = self.needs_refresh(&session);
        let Some(refreshed) = self.ensure_fresh_session(Some(session)).await else {
            return SessionStatus::Expired {
                clear_cookie: self.cookies().clear_cookie(AUTH_COOKIE_NAME),
            };
        };

        if !due {
            return SessionStatus::Active(refreshed);
        }

        match self.cookies().session_cookie(&refreshed, self.now()) {
            Ok(set_cookie) => SessionStatus::Refreshed {
                session: refreshed,
                set_cookie,
            },
            Err(e) => {
                tracing::error!("Failed to encode refreshed session: {e}");
                SessionStatus::Expired {
                    clear_cookie: self.cookies().clear_cookie(AUTH_COOKIE_NAME),
                }
            }
        }
    }
}
