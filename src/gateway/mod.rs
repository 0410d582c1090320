//! Gateway server initialization and lifecycle management.
//!
use crate::{
    config,
    error::GatewayError,
    format::Format,
    gateway::{routes::create_router, state::AppState},
    store::PgStore,
};
use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::{ServiceBuilder, timeout::error::Elapsed};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod routes;
pub mod state;

/// Wraps the routes with the gateway's middleware stack and state.
pub fn build_app(state: AppState) -> Router {
    let timeout = state.config.request_timeout();
    create_router()
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Answers requests that outlive `REQUEST_TIMEOUT_MS` with the JSON error body.
async fn handle_middleware_error(err: BoxError) -> GatewayError {
    if err.is::<Elapsed>() {
        GatewayError::RequestTimeout
    } else {
        GatewayError::InternalError(eyre::eyre!(err))
    }
}

/// Starts the gateway server.
///
/// This function:
/// 1. Initializes tracing with environment-based log filtering
/// 2. Loads configuration from environment variables
/// 3. Opens the Postgres connection pool
/// 4. Configures middleware (timeout, request tracing, CORS)
/// 5. Binds to the configured address and serves HTTP requests until
///    ctrl-c or SIGTERM, then closes the pool
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid
/// - The database pool cannot be opened
/// - The TCP listener cannot bind to the configured address
/// - The server encounters a fatal error while running
pub async fn run() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trial_gateway=info".parse()?),
        )
        .init();

    let config = config::Config::from_env()?;

    let store = PgStore::connect(&config.database).await?;
    info!(
        "Connected to database at {} (max_connections={}, query_timeout={:?})",
        config.database.display_target(),
        config.database.max_connections,
        config.database.query_timeout
    );

    let state = AppState::new(Arc::new(store.clone()))
        .with_config(config.clone())
        .with_format(Format::Json);
    let app = build_app(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    info!("Database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
