// server/src/main.rs

// Entry point for the marketplace HTTP server: loads configuration, wires
// the store, gateways and services together, and serves until a signal.

use anyhow::Result;
use log::info;
use tokio::signal::unix::{signal, SignalKind};

use medimarket_server::routes::build_router;
use medimarket_server::{AppState, ServerConfig};

async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to set up SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to set up SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = ServerConfig::load()?;
    let state = AppState::build(&config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    info!("marketplace listening on {}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
