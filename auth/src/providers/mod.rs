//! Identity provider seam.
//!
//! [`AuthService`](crate::service::AuthService) depends on the
//! [`IdentityProvider`] trait rather than on HTTP directly. Production code
//! plugs in [`Auth0Provider`]; tests plug in
//! [`MockIdentityProvider`](crate::mocks::MockIdentityProvider).

pub mod auth0;

pub use auth0::Auth0Provider;

use crate::error::Result;
use crate::session::TokenResponse;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

/// New database-connection user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Email address (login identifier).
    pub email: String,

    /// Initial password, checked against the connection's password policy.
    pub password: String,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .finish()
    }
}

/// OAuth2/OIDC identity provider with a username/password database.
///
/// Every call is a single attempt; retry policy belongs to the caller.
pub trait IdentityProvider: Send + Sync {
    /// Exchange an authorization code (plus PKCE verifier) for tokens.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The provider rejects the code or verifier
    /// - The request times out or cannot be sent
    /// - The response is malformed
    fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> impl Future<Output = Result<TokenResponse>> + Send;

    /// Trade a refresh token for a new token set.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the refresh token or the
    /// request fails.
    fn refresh_token(&self, refresh_token: &str)
    -> impl Future<Output = Result<TokenResponse>> + Send;

    /// Create a user in database connection `connection`.
    ///
    /// # Errors
    ///
    /// Returns error if the provider rejects the signup (existing user,
    /// weak password) or the request fails.
    fn signup(
        &self,
        connection: &str,
        request: &SignupRequest,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Ask the provider to email a password-reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    fn change_password(
        &self,
        connection: &str,
        email: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}
