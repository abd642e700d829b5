//! End-to-end session lifecycle with the mock identity provider.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::{Duration, TimeZone, Utc};
use empresor_auth::mocks::{MockIdentityProvider, ProviderCall};
use empresor_auth::{
    AUTH_COOKIE_NAME, Auth0Config, AuthError, AuthService, FixedClock, LoginRequest,
    PKCE_COOKIE_NAME, SessionStatus, cookie_value,
};
use std::sync::Arc;

fn config() -> Auth0Config {
    Auth0Config::new(
        "tenant.auth0.com",
        "client-123",
        "client-secret",
        "https://app.example.com/api/auth/callback",
        "https://app.example.com/",
        "cookie-secret",
    )
}

fn service_at(
    provider: &MockIdentityProvider,
    now: chrono::DateTime<Utc>,
) -> AuthService<MockIdentityProvider> {
    AuthService::new(Arc::new(config()), provider.clone())
        .with_clock(Arc::new(FixedClock::new(now)))
}

/// Cookie value carried by a `Set-Cookie` header value.
fn value(set_cookie: &str, name: &str) -> String {
    let (pair, _) = set_cookie.split_once(';').unwrap();
    cookie_value(pair, name).unwrap().to_string()
}

fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    let params: Vec<(String, String)> = serde_urlencoded::from_str(query).ok()?;
    params.into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

#[tokio::test]
async fn login_refresh_logout_lifecycle() {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let provider = MockIdentityProvider::new().with_expires_in(3600).without_rotation();
    let service = service_at(&provider, start);

    // Start login, remembering where to go afterwards
    let redirect = service
        .begin_login(&LoginRequest {
            screen_hint: None,
            return_to: Some("/dashboard/quotes".to_string()),
        })
        .unwrap();
    let state = query_param(&redirect.authorize_url, "state").unwrap();
    let challenge = query_param(&redirect.authorize_url, "code_challenge").unwrap();
    let pkce = value(&redirect.set_cookie, PKCE_COOKIE_NAME);

    // Callback
    let completion = service
        .complete_login("auth-code", &state, Some(&pkce))
        .await
        .unwrap();
    assert_eq!(completion.return_to, "/dashboard/quotes");

    let ProviderCall::ExchangeCode { code_verifier, .. } = provider.calls()[0].clone() else {
        panic!("expected a code exchange");
    };
    assert_eq!(empresor_auth::pkce::code_challenge(&code_verifier), challenge);

    let session_cookie = value(&completion.set_cookies[0], AUTH_COOKIE_NAME);
    assert!(completion.set_cookies[0].contains("Max-Age=3600"));

    // Ten minutes later the session is still fresh
    let later = service_at(&provider, start + Duration::minutes(10));
    assert!(matches!(
        later.authenticate(Some(&session_cookie)).await,
        SessionStatus::Active(_)
    ));
    assert_eq!(provider.call_count(), 1);

    // Thirty seconds before expiry it is refreshed, keeping the refresh token
    let near_expiry = service_at(&provider, start + Duration::seconds(3570));
    let SessionStatus::Refreshed { session, set_cookie } =
        near_expiry.authenticate(Some(&session_cookie)).await
    else {
        panic!("expected a refresh");
    };
    assert_eq!(session.access_token, "access-2");
    assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    assert!(set_cookie.contains("Max-Age=3600"));

    // Logout clears the session cookie
    let logout = near_expiry.logout(None).unwrap();
    assert_eq!(
        query_param(&logout.logout_url, "returnTo").as_deref(),
        Some("https://app.example.com/")
    );
    assert!(logout.set_cookie.starts_with("empresor_auth=;"));
}

#[tokio::test]
async fn pkce_cookie_from_another_deployment_is_rejected() {
    let provider = MockIdentityProvider::new();
    let service = service_at(&provider, Utc::now());

    let other = AuthService::new(
        Arc::new(Auth0Config::new("t", "c", "s", "r", "p", "other-secret")),
        MockIdentityProvider::new(),
    );
    let redirect = other.begin_login(&LoginRequest::default()).unwrap();
    let state = query_param(&redirect.authorize_url, "state").unwrap();

    let result = service
        .complete_login("code", &state, Some(&value(&redirect.set_cookie, PKCE_COOKIE_NAME)))
        .await;

    assert_eq!(result, Err(AuthError::LoginAttemptNotFound));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn failed_exchange_propagates() {
    let provider = MockIdentityProvider::failing();
    let service = service_at(&provider, Utc::now());
    let redirect = service.begin_login(&LoginRequest::default()).unwrap();
    let state = query_param(&redirect.authorize_url, "state").unwrap();

    let result = service
        .complete_login("code", &state, Some(&value(&redirect.set_cookie, PKCE_COOKIE_NAME)))
        .await;

    assert!(matches!(result, Err(AuthError::ProviderRejected { status: 403, .. })));
}

#[tokio::test]
async fn session_cookie_cannot_be_replayed_as_pkce_cookie() {
    let provider = MockIdentityProvider::new();
    let service = service_at(&provider, Utc::now());
    let redirect = service.begin_login(&LoginRequest::default()).unwrap();
    let state = query_param(&redirect.authorize_url, "state").unwrap();
    let completion = service
        .complete_login("code", &state, Some(&value(&redirect.set_cookie, PKCE_COOKIE_NAME)))
        .await
        .unwrap();

    let session_cookie = value(&completion.set_cookies[0], AUTH_COOKIE_NAME);
    let result = service.complete_login("code", &state, Some(&session_cookie)).await;
    assert_eq!(result, Err(AuthError::LoginAttemptNotFound));
}
