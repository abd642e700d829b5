//! Mock identity provider for testing.

use crate::error::{AuthError, Result};
use crate::providers::{IdentityProvider, SignupRequest};
use crate::session::TokenResponse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// One recorded call to [`MockIdentityProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    /// `exchange_code(code, code_verifier)`
    ExchangeCode {
        /// Authorization code
        code: String,
        /// PKCE verifier
        code_verifier: String,
    },
    /// `refresh_token(refresh_token)`
    RefreshToken {
        /// Refresh token presented
        refresh_token: String,
    },
    /// `signup(connection, request)`
    Signup {
        /// Database connection
        connection: String,
        /// Email of the new user
        email: String,
    },
    /// `change_password(connection, email)`
    ChangePassword {
        /// Database connection
        connection: String,
        /// Email the reset link goes to
        email: String,
    },
}

/// Mock identity provider.
///
/// Issues numbered tokens (`access-1`, `refresh-1`, ...) and records every
/// call so tests can assert on what reached the provider.
#[derive(Debug, Clone)]
pub struct MockIdentityProvider {
    /// Error returned by every call, if set.
    pub failure: Option<AuthError>,

    /// Whether refresh responses carry a new refresh token.
    pub rotate_refresh_tokens: bool,

    /// `expires_in` of issued tokens, in seconds.
    pub expires_in: i64,

    /// id_token included in token responses.
    pub id_token: Option<String>,

    calls: Arc<Mutex<Vec<ProviderCall>>>,
    issued: Arc<AtomicU64>,
}

impl MockIdentityProvider {
    /// Create a mock that succeeds with rotating refresh tokens.
    #[must_use]
    pub fn new() -> Self {
        Self {
            failure: None,
            rotate_refresh_tokens: true,
            expires_in: 86_400,
            id_token: None,
            calls: Arc::new(Mutex::new(Vec::new())),
            issued: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a mock that rejects every call like a bad grant.
    #[must_use]
    pub fn failing() -> Self {
        Self::new().with_failure(AuthError::ProviderRejected {
            status: 403,
            message: "Invalid authorization code".to_string(),
        })
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn with_failure(mut self, error: AuthError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Omit `refresh_token` from refresh responses.
    #[must_use]
    pub const fn without_rotation(mut self) -> Self {
        self.rotate_refresh_tokens = false;
        self
    }

    /// Issue tokens living `expires_in` seconds.
    #[must_use]
    pub const fn with_expires_in(mut self, expires_in: i64) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Include `id_token` in token responses.
    #[must_use]
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    /// All calls received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn record(&self, call: ProviderCall) -> Result<()> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn issue_tokens(&self, with_refresh_token: bool) -> TokenResponse {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        TokenResponse {
            access_token: format!("access-{n}"),
            id_token: self.id_token.clone(),
            refresh_token: with_refresh_token.then(|| format!("refresh-{n}")),
            expires_in: self.expires_in,
            token_type: "Bearer".to_string(),
            scope: None,
        }
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MockIdentityProvider {
    async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse> {
        self.record(ProviderCall::ExchangeCode {
            code: code.to_string(),
            code_verifier: code_verifier.to_string(),
        })?;
        Ok(self.issue_tokens(true))
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        self.record(ProviderCall::RefreshToken {
            refresh_token: refresh_token.to_string(),
        })?;
        Ok(self.issue_tokens(self.rotate_refresh_tokens))
    }

    async fn signup(&self, connection: &str, request: &SignupRequest) -> Result<()> {
        self.record(ProviderCall::Signup {
            connection: connection.to_string(),
            email: request.email.clone(),
        })
    }

    async fn change_password(&self, connection: &str, email: &str) -> Result<()> {
        self.record(ProviderCall::ChangePassword {
            connection: connection.to_string(),
            email: email.to_string(),
        })
    }
}
