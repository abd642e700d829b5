//! Standalone auth server.
//!
//! Mounts the auth router under `/api/auth` and serves it until Ctrl-C.
//!
//! # Environment
//!
//! - `AUTH0_*`, `APP_ENV`: see [`Auth0Config::from_env`]
//! - `AUTH_SERVER_ADDR`: listen address (default `0.0.0.0:3001`)
//! - `RUST_LOG`: log filter (default `empresor_auth=info,tower_http=info`)

use axum::Router;
use empresor_auth::{Auth0Config, Auth0Provider, AuthService, auth_router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:3001";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    init_tracing();

    let config = Arc::new(Auth0Config::from_env()?);
    info!(domain = %config.domain, secure_cookies = config.secure_cookies, "Loaded Auth0 configuration");

    let provider = Auth0Provider::new(&config)?;
    let service = Arc::new(AuthService::new(config, provider));

    let app = Router::new()
        .nest("/api/auth", auth_router(service))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = std::env::var("AUTH_SERVER_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Auth server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Auth server stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "empresor_auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Unable to listen for shutdown signal: {e}"),
    }
}
