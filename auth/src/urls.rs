//! Redirect URLs for Auth0's hosted login and logout pages.
//!
//! Pure string building; no network access and no state.

use crate::config::Auth0Config;
use crate::constants::{endpoints, oauth};
use crate::error::{AuthError, Result};

/// Per-attempt parameters for [`build_authorize_url`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizeParams<'a> {
    /// Anti-CSRF state stored in the PKCE cookie.
    pub state: &'a str,

    /// S256 challenge of the stored code verifier.
    pub code_challenge: &'a str,

    /// Auth0 `screen_hint` (e.g. "signup").
    pub screen_hint: Option<&'a str>,

    /// Passed through as `app_return_to`.
    pub return_to: Option<&'a str>,
}

/// Build the `/authorize` URL for an authorization-code-with-PKCE login.
///
/// # Errors
///
/// Returns [`AuthError::UrlBuildFailed`] if the query cannot be encoded.
pub fn build_authorize_url(config: &Auth0Config, params: &AuthorizeParams<'_>) -> Result<String> {
    let mut query = vec![
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", oauth::SCOPE),
    ];

    if let Some(audience) = config.audience.as_deref().filter(|a| !a.is_empty()) {
        query.push(("audience", audience));
    }

    query.push(("code_challenge_method", oauth::CODE_CHALLENGE_METHOD));
    query.push(("code_challenge", params.code_challenge));
    query.push(("state", params.state));

    if let Some(screen_hint) = params.screen_hint.filter(|s| !s.is_empty()) {
        query.push(("screen_hint", screen_hint));
    }

    if let Some(return_to) = params.return_to.filter(|r| !r.is_empty()) {
        query.push(("app_return_to", return_to));
    }

    with_query(config, endpoints::AUTHORIZE, &query)
}

/// Build the `/v2/logout` URL.
///
/// `return_to` falls back to `config.post_logout_redirect_uri` when absent or empty.
///
/// # Errors
///
/// Returns [`AuthError::UrlBuildFailed`] if the query cannot be encoded.
pub fn build_logout_url(config: &Auth0Config, return_to: Option<&str>) -> Result<String> {
    let return_to = return_to
        .filter(|r| !r.is_empty())
        .unwrap_or(&config.post_logout_redirect_uri);

    with_query(
        config,
        endpoints::LOGOUT,
        &[("client_id", config.client_id.as_str()), ("returnTo", return_to)],
    )
}

fn with_query(config: &Auth0Config, path: &str, query: &[(&str, &str)]) -> Result<String> {
    let query = serde_urlencoded::to_string(query)
        .map_err(|e| AuthError::UrlBuildFailed(e.to_string()))?;
    Ok(format!("{}{path}?{query}", config.issuer_url()))
}
