//! Login, callback and logout handlers.
//!
//! All three answer with a 307 redirect plus `Set-Cookie` headers.

use super::{ApiError, non_empty, redirect, request_cookie, set_cookies};
use crate::constants::cookies::PKCE_COOKIE_NAME;
use crate::error::AuthError;
use crate::flow::LoginRequest;
use crate::providers::IdentityProvider;
use crate::service::AuthService;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

/// Query parameters of `GET /login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginQuery {
    /// Auth0 `screen_hint` (e.g. "signup").
    pub screen_hint: Option<String>,

    /// Path to return to after login.
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Query parameters of `GET /callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code.
    pub code: Option<String>,

    /// State echoed back by the provider.
    pub state: Option<String>,

    /// Provider error code, if the user cancelled or the provider failed.
    pub error: Option<String>,
}

/// Query parameters of `GET /logout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutQuery {
    /// Where the provider should send the browser after logout.
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// Redirect to the hosted login page.
///
/// # Endpoint
///
/// ```text
/// GET /login?screen_hint=signup&returnTo=/dashboard/quotes
/// ```
///
/// # Errors
///
/// Returns 500 if the PKCE cookie or authorize URL cannot be built.
pub async fn login<P>(
    State(service): State<Arc<AuthService<P>>>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, ApiError>
where
    P: IdentityProvider + 'static,
{
    let started = service.begin_login(&LoginRequest {
        screen_hint: non_empty(query.screen_hint),
        return_to: non_empty(query.return_to),
    })?;

    Ok((set_cookies([started.set_cookie]), redirect(&started.authorize_url)).into_response())
}

/// Finish the login started by [`login`].
///
/// # Endpoint
///
/// ```text
/// GET /callback?code=...&state=...
/// ```
///
/// Failures redirect back to `/login` with an `error` query parameter:
/// - `invalid_callback`: `code` or `state` missing
/// - `invalid_state`: PKCE cookie missing or state mismatch
/// - `auth0_callback_failed`: code exchange failed
pub async fn callback<P>(
    State(service): State<Arc<AuthService<P>>>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
) -> Response
where
    P: IdentityProvider + 'static,
{
    let (Some(code), Some(state)) = (non_empty(query.code), non_empty(query.state)) else {
        if let Some(error) = query.error {
            tracing::warn!(error = %error, "Provider returned an error to the callback");
        }
        return redirect("/login?error=invalid_callback");
    };

    let pkce_cookie = request_cookie(&headers, PKCE_COOKIE_NAME);

    match service.complete_login(&code, &state, pkce_cookie).await {
        Ok(completion) => (
            set_cookies(completion.set_cookies),
            redirect(&completion.return_to),
        )
            .into_response(),
        Err(AuthError::LoginAttemptNotFound | AuthError::OAuthStateInvalid) => {
            redirect("/login?error=invalid_state")
        }
        Err(e) => {
            tracing::error!(error = %e, "Auth0 callback failed");
            redirect("/login?error=auth0_callback_failed")
        }
    }
}

/// Clear the session and log out of the provider.
///
/// # Endpoint
///
/// ```text
/// GET /logout?returnTo=https://app.example.com/
/// ```
///
/// # Errors
///
/// Returns 500 if the logout URL cannot be built.
pub async fn logout<P>(
    State(service): State<Arc<AuthService<P>>>,
    Query(query): Query<LogoutQuery>,
) -> Result<Response, ApiError>
where
    P: IdentityProvider + 'static,
{
    let logout = service.logout(query.return_to.as_deref())?;

    Ok((set_cookies([logout.set_cookie]), redirect(&logout.logout_url)).into_response())
}
