//! Database-connection account handlers: registration and password reset.
//!
//! Request bodies are parsed leniently; a missing or malformed body is
//! treated like one with every field absent.

use super::ApiError;
use super::session::SuccessResponse;
use crate::providers::{IdentityProvider, SignupRequest};
use crate::service::AuthService;
use axum::{Json, body::Bytes, extract::State};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Body of `POST /register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterBody {
    /// Login email.
    pub email: Option<String>,

    /// Initial password.
    pub password: Option<String>,

    /// Display name.
    pub name: Option<String>,
}

/// Body of `POST /forgot-password`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordBody {
    /// Account email.
    pub email: Option<String>,
}

fn lenient_json<T: DeserializeOwned + Default>(body: &Bytes) -> T {
    serde_json::from_slice(body).unwrap_or_default()
}

/// Create an account in the configured database connection.
///
/// # Endpoint
///
/// ```text
/// POST /register
/// {"email": "...", "password": "...", "name": "..."}
/// ```
///
/// # Errors
///
/// - 400 `Invalid registration data`: email or password missing
/// - 400 `Unable to create the account right now`: provider or config failure
pub async fn register<P>(
    State(service): State<Arc<AuthService<P>>>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError>
where
    P: IdentityProvider + 'static,
{
    let body: RegisterBody = lenient_json(&body);

    let (Some(email), Some(password)) = (
        body.email.filter(|e| !e.is_empty()),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Invalid registration data"));
    };

    let request = SignupRequest {
        email,
        password,
        name: body.name.filter(|n| !n.is_empty()),
    };

    service.create_user(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Auth0 register failed");
        ApiError::bad_request("Unable to create the account right now")
    })?;

    Ok(Json(SuccessResponse::OK))
}

/// Send a password-reset email.
///
/// # Endpoint
///
/// ```text
/// POST /forgot-password
/// {"email": "..."}
/// ```
///
/// # Errors
///
/// - 400 `Email is required`
/// - 400 `Unable to send the password reset email`: provider or config failure
pub async fn forgot_password<P>(
    State(service): State<Arc<AuthService<P>>>,
    body: Bytes,
) -> Result<Json<SuccessResponse>, ApiError>
where
    P: IdentityProvider + 'static,
{
    let body: ForgotPasswordBody = lenient_json(&body);

    let Some(email) = body.email.filter(|e| !e.is_empty()) else {
        return Err(ApiError::bad_request("Email is required"));
    };

    service
        .request_password_reset_email(&email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Auth0 forgot password failed");
            ApiError::bad_request("Unable to send the password reset email")
        })?;

    Ok(Json(SuccessResponse::OK))
}

/// Password resets are completed on the provider's hosted page.
///
/// # Endpoint
///
/// ```text
/// POST /reset-password
/// ```
///
/// # Errors
///
/// Always 400, pointing the client at the emailed link.
pub async fn reset_password() -> ApiError {
    ApiError::bad_request("Password reset must be completed through the link emailed by Auth0")
}
