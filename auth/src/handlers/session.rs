//! Session inspection and refresh handlers.

use super::{ApiError, request_cookie, set_cookies};
use crate::constants::cookies::AUTH_COOKIE_NAME;
use crate::flow::SessionStatus;
use crate::providers::IdentityProvider;
use crate::service::AuthService;
use crate::session::Claims;
use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Body of a successful `GET /session`.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// id_token claims.
    pub user: Claims,

    /// Tokens for calling downstream APIs.
    pub tokens: SessionTokens,
}

/// Tokens exposed to the browser client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokens {
    /// Access token.
    pub access_token: String,

    /// Refresh token, `null` when the session has none.
    pub refresh_token: Option<String>,
}

/// Body of a successful mutation.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuccessResponse {
    /// Always `true`.
    pub success: bool,
}

impl SuccessResponse {
    /// `{"success": true}`
    pub const OK: Self = Self { success: true };
}

/// Force a token refresh.
///
/// # Endpoint
///
/// ```text
/// POST /refresh
/// ```
///
/// # Errors
///
/// - 401 `Unable to refresh`: no valid session or no refresh token
/// - 401 `Refresh failed`: the provider rejected the refresh
pub async fn refresh<P>(
    State(service): State<Arc<AuthService<P>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    P: IdentityProvider + 'static,
{
    let refresh_token = service
        .cookies()
        .read_session(request_cookie(&headers, AUTH_COOKIE_NAME))
        .and_then(|session| session.refresh_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Unable to refresh"))?;

    let refreshed = service.refresh_tokens(&refresh_token).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to refresh tokens");
        ApiError::unauthorized("Refresh failed")
    })?;

    let cookie = service.cookies().session_cookie(&refreshed, service.now())?;

    Ok((set_cookies([cookie]), Json(SuccessResponse::OK)).into_response())
}

/// Current user and tokens, refreshing the session when it is due.
///
/// # Endpoint
///
/// ```text
/// GET /session
/// ```
///
/// # Errors
///
/// - 401 `Not authenticated`: no valid session cookie
/// - 401 `Session expired`: refresh was due and failed (cookie cleared)
/// - 401 `Invalid session`: the session has no decodable id_token
pub async fn get_session<P>(
    State(service): State<Arc<AuthService<P>>>,
    headers: HeaderMap,
) -> Result<Response, ApiError>
where
    P: IdentityProvider + 'static,
{
    let status = service
        .authenticate(request_cookie(&headers, AUTH_COOKIE_NAME))
        .await;

    let (session, set_cookie) = match status {
        SessionStatus::Anonymous => return Err(ApiError::unauthorized("Not authenticated")),
        SessionStatus::Expired { clear_cookie } => {
            return Err(ApiError::unauthorized("Session expired").with_cookie(clear_cookie));
        }
        SessionStatus::Active(session) => (session, None),
        SessionStatus::Refreshed {
            session,
            set_cookie,
        } => (session, Some(set_cookie)),
    };

    let user = session
        .user_claims()
        .ok_or_else(|| ApiError::unauthorized("Invalid session"))?;

    let body = SessionResponse {
        user,
        tokens: SessionTokens {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        },
    };

    Ok((set_cookies(set_cookie), Json(body)).into_response())
}
