//! HTTP front for the booking relay.
//!
//! The relay is mounted at `/api/reservation` and accepts every method, so that preflight
//! and method checks are answered by the relay itself with its own headers and bodies.
use std::{io, sync::Arc};

use axum::{routing::any, Router};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;
pub mod routes;
pub mod state;

use config::ServerConfig;
use routes::reservation_handler;
use state::AppState;

pub const RESERVATION_PATH: &str = "/api/reservation";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(RESERVATION_PATH, any(reservation_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(config: ServerConfig) -> io::Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config);
    let app = router(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Relay listening on {address}{RESERVATION_PATH}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
