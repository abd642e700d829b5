//! Token-exchange service.
//!
//! [`AuthService`] owns the configuration, the identity provider and the
//! cookie jar for one deployment. It is cheap to share behind an `Arc` and
//! holds no per-request state.

use crate::clock::{Clock, SystemClock};
use crate::config::Auth0Config;
use crate::constants::oauth::DEFAULT_REFRESH_THRESHOLD_SECS;
use crate::cookies::SessionCookies;
use crate::error::{AuthError, Result};
use crate::providers::{IdentityProvider, SignupRequest};
use crate::session::StoredSession;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Session operations backed by an [`IdentityProvider`].
pub struct AuthService<P> {
    config: Arc<Auth0Config>,
    provider: P,
    cookies: SessionCookies,
    clock: Arc<dyn Clock>,
    refresh_threshold_secs: i64,
}

impl<P: IdentityProvider> AuthService<P> {
    /// Create a service using the wall clock and the default refresh threshold.
    #[must_use]
    pub fn new(config: Arc<Auth0Config>, provider: P) -> Self {
        let cookies = SessionCookies::from_config(&config);
        Self {
            config,
            provider,
            cookies,
            clock: Arc::new(SystemClock),
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
        }
    }

    /// Use `clock` for all expiry math.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Refresh sessions with fewer than `secs` seconds left.
    #[must_use]
    pub const fn with_refresh_threshold(mut self, secs: i64) -> Self {
        self.refresh_threshold_secs = secs;
        self
    }

    /// The deployment configuration.
    #[must_use]
    pub fn config(&self) -> &Auth0Config {
        &self.config
    }

    /// The identity provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The cookie jar.
    #[must_use]
    pub const fn cookies(&self) -> &SessionCookies {
        &self.cookies
    }

    /// Current time according to the service clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Whether `session` is due for a refresh now.
    #[must_use]
    pub fn is_refresh_due(&self, session: &StoredSession) -> bool {
        session.should_refresh(self.refresh_threshold_secs, self.now())
    }

    /// Whether [`ensure_fresh_session`](Self::ensure_fresh_session) would call
    /// the provider for `session`: it carries a refresh token and is due.
    #[must_use]
    pub fn needs_refresh(&self, session: &StoredSession) -> bool {
        session.can_refresh() && self.is_refresh_due(session)
    }

    /// Exchange an authorization code for a new session.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub async fn exchange_code_for_tokens(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<StoredSession> {
        let tokens = self.provider.exchange_code(code, code_verifier).await?;
        let session = StoredSession::from_tokens(&tokens, self.now());

        tracing::info!(expires_at = session.expires_at, "Authorization code exchanged");

        Ok(session)
    }

    /// Trade `refresh_token` for a new session.
    ///
    /// When the provider does not rotate refresh tokens (the response omits
    /// one, or sends it empty) the presented token is kept.
    ///
    /// # Errors
    ///
    /// Propagates provider failures unchanged.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<StoredSession> {
        let mut tokens = self.provider.refresh_token(refresh_token).await?;

        if tokens.refresh_token.as_deref().is_none_or(str::is_empty) {
            tokens.refresh_token = Some(refresh_token.to_string());
        }

        let session = StoredSession::from_tokens(&tokens, self.now());
        tracing::info!(expires_at = session.expires_at, "Session refreshed");

        Ok(session)
    }

    /// Register a user in the configured database connection.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DbConnectionRequired`] (without calling the
    /// provider) when no connection is configured, otherwise propagates
    /// provider failures.
    pub async fn create_user(&self, request: &SignupRequest) -> Result<()> {
        let connection = self.db_connection("user registration")?;
        self.provider.signup(connection, request).await?;

        tracing::info!("User registered");
        Ok(())
    }

    /// Ask the provider to send a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DbConnectionRequired`] (without calling the
    /// provider) when no connection is configured, otherwise propagates
    /// provider failures.
    pub async fn request_password_reset_email(&self, email: &str) -> Result<()> {
        let connection = self.db_connection("password reset")?;
        self.provider.change_password(connection, email).await?;

        tracing::info!("Password reset email requested");
        Ok(())
    }

    /// Return a session that is valid for at least the refresh threshold.
    ///
    /// - no session: `None`
    /// - no refresh token, or not yet due: the session unchanged
    /// - due: the refreshed session, or `None` if the refresh failed
    pub async fn ensure_fresh_session(
        &self,
        session: Option<StoredSession>,
    ) -> Option<StoredSession> {
        let session = session?;

        if !self.needs_refresh(&session) {
            return Some(session);
        }

        let refresh_token = session.refresh_token.as_deref().unwrap_or_default();
        match self.refresh_tokens(refresh_token).await {
            Ok(refreshed) => Some(refreshed),
            Err(e) => {
                tracing::warn!("Failed to refresh session: {e}");
                None
            }
        }
    }

    fn db_connection(&self, operation: &'static str) -> Result<&str> {
        self.config
            .db_connection
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(AuthError::DbConnectionRequired { operation })
    }
}

impl<P> std::fmt::Debug for AuthService<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("config", &self.config)
            .field("refresh_threshold_secs", &self.refresh_threshold_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::mocks::{MockIdentityProvider, ProviderCall};
    use chrono::Duration;

    fn config() -> Auth0Config {
        Auth0Config::new(
            "tenant.auth0.com",
            "client-123",
            "secret",
            "https://app.example.com/api/auth/callback",
            "https://app.example.com/",
            "cookie-secret",
        )
    }

    fn service(provider: MockIdentityProvider, now: DateTime<Utc>) -> AuthService<MockIdentityProvider> {
        AuthService::new(Arc::new(config().with_db_connection("Username-Password")), provider)
            .with_clock(Arc::new(FixedClock::new(now)))
    }

    fn session_expiring_in(now: DateTime<Utc>, secs: i64, refresh_token: Option<&str>) -> StoredSession {
        StoredSession {
            access_token: "old-access".to_string(),
            id_token: None,
            refresh_token: refresh_token.map(str::to_string),
            expires_at: (now + Duration::seconds(secs)).timestamp_millis(),
        }
    }

    #[tokio::test]
    async fn test_exchange_code_builds_session() {
        let now = Utc::now();
        let provider = MockIdentityProvider::new().with_expires_in(3600);
        let service = service(provider.clone(), now);

        let session = service.exchange_code_for_tokens("code", "verifier").await.unwrap();

        assert_eq!(session.access_token, "access-1");
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(session.expires_at, now.timestamp_millis() + 3_600_000);
        assert_eq!(
            provider.calls(),
            vec![ProviderCall::ExchangeCode {
                code: "code".to_string(),
                code_verifier: "verifier".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_refresh_preserves_token_without_rotation() {
        let provider = MockIdentityProvider::new().without_rotation();
        let service = service(provider, Utc::now());

        let session = service.refresh_tokens("original-refresh").await.unwrap();
        assert_eq!(session.refresh_token.as_deref(), Some("original-refresh"));
    }

    #[tokio::test]
    async fn test_refresh_takes_rotated_token() {
        let service = service(MockIdentityProvider::new(), Utc::now());
        let session = service.refresh_tokens("original-refresh").await.unwrap();
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_create_user_requires_db_connection() {
        let provider = MockIdentityProvider::new();
        let service = AuthService::new(Arc::new(config()), provider.clone());
        let request = SignupRequest {
            email: "ana@empresor.app".to_string(),
            password: "correct horse".to_string(),
            name: None,
        };

        let result = service.create_user(&request).await;

        assert_eq!(
            result,
            Err(AuthError::DbConnectionRequired {
                operation: "user registration"
            })
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_password_reset_requires_db_connection() {
        let provider = MockIdentityProvider::new();
        let service = AuthService::new(Arc::new(config()), provider.clone());

        let result = service.request_password_reset_email("ana@empresor.app").await;

        assert_eq!(
            result,
            Err(AuthError::DbConnectionRequired {
                operation: "password reset"
            })
        );
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_password_reset_uses_connection() {
        let provider = MockIdentityProvider::new();
        let service = service(provider.clone(), Utc::now());

        service
            .request_password_reset_email("ana@empresor.app")
            .await
            .unwrap();

        assert_eq!(
            provider.calls(),
            vec![ProviderCall::ChangePassword {
                connection: "Username-Password".to_string(),
                email: "ana@empresor.app".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_ensure_fresh_session_cases() {
        let now = Utc::now();
        let provider = MockIdentityProvider::new();
        let service = service(provider.clone(), now);

        assert_eq!(service.ensure_fresh_session(None).await, None);

        let fresh = session_expiring_in(now, 3600, Some("r"));
        assert_eq!(service.ensure_fresh_session(Some(fresh.clone())).await, Some(fresh));

        let no_refresh = session_expiring_in(now, 10, None);
        assert_eq!(
            service.ensure_fresh_session(Some(no_refresh.clone())).await,
            Some(no_refresh)
        );
        assert_eq!(provider.call_count(), 0);

        let due = session_expiring_in(now, 10, Some("r"));
        let refreshed = service.ensure_fresh_session(Some(due)).await.unwrap();
        assert_eq!(refreshed.access_token, "access-1");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_fresh_session_refresh_failure() {
        let now = Utc::now();
        let service = service(MockIdentityProvider::failing(), now);

        let due = session_expiring_in(now, 10, Some("r"));
        assert_eq!(service.ensure_fresh_session(Some(due)).await, None);
    }

    #[test]
    fn test_custom_refresh_threshold() {
        let now = Utc::now();
        let service = service(MockIdentityProvider::new(), now).with_refresh_threshold(300);

        assert!(service.is_refresh_due(&session_expiring_in(now, 200, Some("r"))));
        assert!(!service.is_refresh_due(&session_expiring_in(now, 400, Some("r"))));
    }
}
