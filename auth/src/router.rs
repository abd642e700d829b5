//! Authentication router composition.
//!
//! Composes all auth handlers into a single Axum router.

use crate::handlers::{account, login, session};
use crate::providers::IdentityProvider;
use crate::service::AuthService;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Create the auth router.
///
/// # Routes
///
/// ## Login
/// - `GET /login` - Redirect to the hosted login page
/// - `GET /callback` - Finish login, set the session cookie
/// - `GET /logout` - Clear the session, redirect to provider logout
///
/// ## Session
/// - `GET /session` - Current user and tokens
/// - `POST /refresh` - Force a token refresh
///
/// ## Account
/// - `POST /register` - Create a database-connection user
/// - `POST /forgot-password` - Send a password-reset email
/// - `POST /reset-password` - Always 400 (resets finish on the hosted page)
///
/// # Example
///
/// ```rust,ignore
/// let config = Arc::new(Auth0Config::from_env()?);
/// let provider = Auth0Provider::new(&config)?;
/// let service = Arc::new(AuthService::new(config, provider));
///
/// let app = Router::new()
///     .nest("/api/auth", auth_router(service))
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn auth_router<P>(service: Arc<AuthService<P>>) -> Router
where
    P: IdentityProvider + 'static,
{
    Router::new()
        // Login routes
        .route("/login", get(login::login::<P>))
        .route("/callback", get(login::callback::<P>))
        .route("/logout", get(login::logout::<P>))
        // Session routes
        .route("/session", get(session::get_session::<P>))
        .route("/refresh", post(session::refresh::<P>))
        // Account routes
        .route("/register", post(account::register::<P>))
        .route("/forgot-password", post(account::forgot_password::<P>))
        .route("/reset-password", post(account::reset_password))
        .with_state(service)
}
