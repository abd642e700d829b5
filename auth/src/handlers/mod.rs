//! HTTP handlers for the auth endpoints (Axum).
//!
//! Handlers are thin: they pull query parameters and cookies out of the
//! request, call into [`AuthService`](crate::service::AuthService) and turn
//! the outcome into redirects or JSON.

pub mod account;
pub mod error;
pub mod login;
pub mod session;

pub use error::ApiError;

use crate::constants::oauth::DEFAULT_RETURN_TO;
use axum::http::{
    HeaderMap, HeaderName, HeaderValue, StatusCode,
    header::{COOKIE, LOCATION, SET_COOKIE},
};
use axum::response::{AppendHeaders, IntoResponse, Response};

/// Value of cookie `name` from the request's `Cookie` headers.
pub(crate) fn request_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| crate::cookies::cookie_value(header, name))
}

/// `Set-Cookie` headers for a response, dropping values that are not valid
/// header values.
pub(crate) fn set_cookies<I>(cookies: I) -> AppendHeaders<Vec<(HeaderName, HeaderValue)>>
where
    I: IntoIterator<Item = String>,
{
    AppendHeaders(
        cookies
            .into_iter()
            .filter_map(|cookie| match HeaderValue::try_from(cookie) {
                Ok(value) => Some((SET_COOKIE, value)),
                Err(e) => {
                    tracing::error!("Invalid Set-Cookie value: {e}");
                    None
                }
            })
            .collect(),
    )
}

/// 307 redirect to `location`.
///
/// A location that is not a valid header value is logged and replaced by
/// the default post-login path instead of failing the response.
pub(crate) fn redirect(location: &str) -> Response {
    let value = HeaderValue::try_from(location).unwrap_or_else(|e| {
        tracing::error!("Invalid redirect location: {e}");
        HeaderValue::from_static(DEFAULT_RETURN_TO)
    });

    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, value)]).into_response()
}

/// Treat empty query parameters as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
