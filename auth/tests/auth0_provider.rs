//! Auth0Provider against a local HTTP server.

#![allow(clippy::unwrap_used)]

use empresor_auth::{Auth0Config, Auth0Provider, AuthError, AuthService, IdentityProvider, SignupRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> Auth0Config {
    Auth0Config::new(
        "tenant.auth0.com",
        "client-123",
        "client-secret",
        "https://app.example.com/api/auth/callback",
        "https://app.example.com/",
        "cookie-secret",
    )
    .with_db_connection("Username-Password-Authentication")
}

fn provider(config: &Auth0Config, server: &MockServer) -> Auth0Provider {
    Auth0Provider::new(config).unwrap().with_base_url(server.uri())
}

fn token_body(refresh_token: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "access_token": "new-access",
        "id_token": "header.payload.signature",
        "expires_in": 86400,
        "token_type": "Bearer",
        "scope": "openid profile email offline_access",
    });
    if let Some(token) = refresh_token {
        body["refresh_token"] = json!(token);
    }
    body
}

#[tokio::test]
async fn exchange_code_posts_authorization_code_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_json(json!({
            "grant_type": "authorization_code",
            "client_id": "client-123",
            "client_secret": "client-secret",
            "code": "auth-code",
            "redirect_uri": "https://app.example.com/api/auth/callback",
            "code_verifier": "verifier",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(Some("new-refresh"))))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = provider(&config(), &server)
        .exchange_code("auth-code", "verifier")
        .await
        .unwrap();

    assert_eq!(tokens.access_token, "new-access");
    assert_eq!(tokens.refresh_token.as_deref(), Some("new-refresh"));
    assert_eq!(tokens.expires_in, 86400);
}

#[tokio::test]
async fn rejected_exchange_uses_error_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code",
        })))
        .mount(&server)
        .await;

    let result = provider(&config(), &server)
        .exchange_code("stale-code", "verifier")
        .await;

    assert_eq!(
        result,
        Err(AuthError::ProviderRejected {
            status: 403,
            message: "Invalid authorization code".to_string(),
        })
    );
}

#[tokio::test]
async fn rejected_signup_uses_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dbconnections/signup"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": "BadRequestError",
            "message": "The user already exists.",
            "statusCode": 400,
        })))
        .mount(&server)
        .await;

    let request = SignupRequest {
        email: "ana@empresor.app".to_string(),
        password: "correct horse battery".to_string(),
        name: None,
    };
    let result = provider(&config(), &server)
        .signup("Username-Password-Authentication", &request)
        .await;

    assert_eq!(
        result.unwrap_err().to_string(),
        "The user already exists."
    );
}

#[tokio::test]
async fn non_json_error_body_is_used_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let error = provider(&config(), &server)
        .refresh_token("refresh")
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "upstream unavailable");
    assert!(error.is_transient());
}

#[tokio::test]
async fn empty_error_body_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let error = provider(&config(), &server)
        .refresh_token("refresh")
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), "Auth0 request failed");
}

#[tokio::test]
async fn change_password_ignores_plain_text_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dbconnections/change_password"))
        .and(body_json(json!({
            "client_id": "client-123",
            "connection": "Username-Password-Authentication",
            "email": "ana@empresor.app",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("We've just sent you an email to reset your password."),
        )
        .expect(1)
        .mount(&server)
        .await;

    provider(&config(), &server)
        .change_password("Username-Password-Authentication", "ana@empresor.app")
        .await
        .unwrap();
}

#[tokio::test]
async fn undecodable_token_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = provider(&config(), &server).exchange_code("c", "v").await;
    assert!(matches!(result, Err(AuthError::InvalidProviderResponse(_))));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body(None))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = config().with_http_timeout(Duration::from_millis(200));
    let result = provider(&config, &server).exchange_code("c", "v").await;

    assert_eq!(
        result,
        Err(AuthError::ProviderTimeout(Duration::from_millis(200)))
    );
}

#[tokio::test]
async fn unreachable_provider_is_unavailable() {
    let provider = Auth0Provider::new(&config())
        .unwrap()
        .with_base_url("http://127.0.0.1:1");

    let result = provider.refresh_token("refresh").await;
    assert!(matches!(result, Err(AuthError::ProviderUnavailable(_))));
}

#[tokio::test]
async fn service_keeps_refresh_token_when_provider_omits_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_partial_json(json!({
            "grant_type": "refresh_token",
            "refresh_token": "original-refresh",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(None)))
        .expect(1)
        .mount(&server)
        .await;

    let config = Arc::new(config());
    let service = AuthService::new(Arc::clone(&config), provider(&config, &server));

    let session = service.refresh_tokens("original-refresh").await.unwrap();

    assert_eq!(session.access_token, "new-access");
    assert_eq!(session.refresh_token.as_deref(), Some("original-refresh"));
}

#[tokio::test]
async fn service_keeps_refresh_token_when_provider_sends_empty_one() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(Some(""))))
        .mount(&server)
        .await;

    let config = Arc::new(config());
    let service = AuthService::new(Arc::clone(&config), provider(&config, &server));

    let session = service.refresh_tokens("original-refresh").await.unwrap();
    assert_eq!(session.refresh_token.as_deref(), Some("original-refresh"));
}

#[tokio::test]
async fn missing_db_connection_never_reaches_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = config();
    config.db_connection = None;
    let config = Arc::new(config);
    let service = AuthService::new(Arc::clone(&config), provider(&config, &server));

    let result = service.request_password_reset_email("ana@empresor.app").await;
    assert_eq!(
        result,
        Err(AuthError::DbConnectionRequired {
            operation: "password reset"
        })
    );
}
