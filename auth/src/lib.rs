//! # Empresor Auth
//!
//! Auth0 session core for the Empresor web app: authorization-code login
//! with PKCE, sessions carried in HMAC-signed cookies, and proactive token
//! refresh.
//!
//! ## Features
//!
//! - **Stateless sessions**: the whole session lives in a signed cookie
//! - **PKCE (S256)**: every login attempt gets a fresh verifier and state
//! - **Proactive refresh**: sessions are renewed shortly before expiry
//! - **Testable**: the identity provider sits behind a trait with a mock
//!
//! ## Architecture
//!
//! ```text
//! HTTP handlers ──► flow (login/callback/logout/authenticate)
//!                     │
//!                     ▼
//!                  AuthService ──► IdentityProvider (Auth0 / mock)
//!                     │
//!                     ▼
//!                  SessionCookies ──► CookieCodec (HMAC-SHA256)
//! ```
//!
//! ## Example: Mounting the Router
//!
//! ```rust,ignore
//! use empresor_auth::*;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Auth0Config::from_env()?);
//! let provider = Auth0Provider::new(&config)?;
//! let service = Arc::new(AuthService::new(config, provider));
//!
//! let app = axum::Router::new().nest("/api/auth", auth_router(service));
//! ```
//!
//! ## Example: Checking a Request
//!
//! ```rust,ignore
//! match service.authenticate(cookie_value(header, AUTH_COOKIE_NAME)).await {
//!     SessionStatus::Active(session) => { /* serve */ }
//!     SessionStatus::Refreshed { session, set_cookie } => { /* serve + Set-Cookie */ }
//!     SessionStatus::Anonymous | SessionStatus::Expired { .. } => { /* redirect to /login */ }
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod clock;
pub mod codec;
pub mod config;
pub mod constants;
pub mod cookies;
pub mod error;
pub mod flow;
pub mod pkce;
pub mod providers;
pub mod service;
pub mod session;
pub mod urls;

#[cfg(feature = "axum")]
pub mod handlers;
#[cfg(feature = "axum")]
pub mod router;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::CookieCodec;
pub use config::Auth0Config;
pub use constants::cookies::{AUTH_COOKIE_NAME, PKCE_COOKIE_NAME};
pub use cookies::{SessionCookies, cookie_value};
pub use error::{AuthError, ConfigError, Result};
pub use flow::{LoginCompletion, LoginRedirect, LoginRequest, LogoutRedirect, SessionStatus};
pub use pkce::PkcePair;
pub use providers::{Auth0Provider, IdentityProvider, SignupRequest};
pub use service::AuthService;
pub use session::{PkceSessionData, StoredSession, TokenResponse};

#[cfg(feature = "axum")]
pub use handlers::ApiError;
#[cfg(feature = "axum")]
pub use router::auth_router;
