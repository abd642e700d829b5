//! Auth0 implementation of [`IdentityProvider`].
//!
//! Talks to the tenant's Authentication API:
//! - `POST /oauth/token` for code exchange and refresh
//! - `POST /dbconnections/signup` for registration
//! - `POST /dbconnections/change_password` for reset emails
//!
//! All requests are JSON and share one `reqwest::Client` carrying the
//! configured timeout.

use super::{IdentityProvider, SignupRequest};
use crate::config::Auth0Config;
use crate::constants::endpoints;
use crate::error::{AuthError, Result};
use crate::session::TokenResponse;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Message used when the provider gives no usable error text.
const FALLBACK_ERROR_MESSAGE: &str = "Auth0 request failed";

/// Auth0 Authentication API client.
#[derive(Clone)]
pub struct Auth0Provider {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    timeout: Duration,
}

impl fmt::Debug for Auth0Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth0Provider")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Auth0Provider {
    /// Create a provider for the tenant in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::HttpClientInit`] if the HTTP client cannot be built.
    pub fn new(config: &Auth0Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AuthError::HttpClientInit(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.issuer_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            timeout: config.http_timeout,
        })
    }

    /// Override the API base URL (used to point at a local test server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The API base URL, e.g. `https://tenant.auth0.com`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, payload: &T) -> Result<Response> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(path, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = provider_error_message(&body);
        tracing::error!(
            path,
            status = status.as_u16(),
            "Auth0 request failed: {message}"
        );

        Err(AuthError::ProviderRejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_for_tokens<T: Serialize + Sync>(&self, payload: &T) -> Result<TokenResponse> {
        let response = self.post(endpoints::TOKEN, payload).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(endpoints::TOKEN, &e))?;

        serde_json::from_slice(&body).map_err(|e| {
            tracing::error!("Failed to parse Auth0 token response: {e}");
            AuthError::InvalidProviderResponse(e.to_string())
        })
    }

    fn transport_error(&self, path: &str, error: &reqwest::Error) -> AuthError {
        if error.is_timeout() {
            tracing::error!(path, timeout = ?self.timeout, "Auth0 request timed out");
            AuthError::ProviderTimeout(self.timeout)
        } else {
            tracing::error!(path, "Auth0 request could not be sent: {error}");
            AuthError::ProviderUnavailable(error.to_string())
        }
    }
}

impl IdentityProvider for Auth0Provider {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse> {
        tracing::debug!("Exchanging authorization code");
        self.post_for_tokens(&TokenRequest::AuthorizationCode {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            code,
            redirect_uri: &self.redirect_uri,
            code_verifier,
        })
        .await
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        tracing::debug!("Refreshing tokens");
        self.post_for_tokens(&TokenRequest::RefreshToken {
            client_id: &self.client_id,
            client_secret: &self.client_secret,
            refresh_token,
        })
        .await
    }

    async fn signup(&self, connection: &str, request: &SignupRequest) -> Result<()> {
        let payload = SignupPayload {
            client_id: &self.client_id,
            connection,
            email: &request.email,
            password: &request.password,
            name: request.name.as_deref(),
        };
        self.post(endpoints::SIGNUP, &payload).await?;
        Ok(())
    }

    async fn change_password(&self, connection: &str, email: &str) -> Result<()> {
        let payload = ChangePasswordPayload {
            client_id: &self.client_id,
            connection,
            email,
        };
        // Success body is a plain-text sentence, not JSON.
        self.post(endpoints::CHANGE_PASSWORD, &payload).await?;
        Ok(())
    }
}

/// `/oauth/token` request body.
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum TokenRequest<'a> {
    AuthorizationCode {
        client_id: &'a str,
        client_secret: &'a str,
        code: &'a str,
        redirect_uri: &'a str,
        code_verifier: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
    },
}

#[derive(Serialize)]
struct SignupPayload<'a> {
    client_id: &'a str,
    connection: &'a str,
    email: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Serialize)]
struct ChangePasswordPayload<'a> {
    client_id: &'a str,
    connection: &'a str,
    email: &'a str,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Pick the human-readable message out of a non-2xx response body.
///
/// Order: `error_description`, then `message`, then the raw body when it
/// is not JSON, then a fixed fallback.
fn provider_error_message(body: &str) -> String {
    let (description, message) = match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => (parsed.error_description, parsed.message),
        Err(_) => (None, Some(body.trim().to_string())),
    };

    description
        .filter(|d| !d.is_empty())
        .or_else(|| message.filter(|m| !m.is_empty()))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}
