//! Switchboard - local reverse proxy for chat-completion APIs
//!
//! This is the main entry point for the Switchboard proxy server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{info, warn};

use switchboard::{routes, AppState, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=info,tower_http=info".into()),
        )
        .with_target(true)
        .init();

    info!("Starting Switchboard proxy");

    // Load configuration; any config error aborts startup
    let settings = Settings::load()?;
    info!("Configuration loaded successfully");

    info!("Available providers:");
    for name in settings.providers.keys() {
        info!("  - {}", name);
    }

    // Bind address comes from settings before they move into the state
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;

    // Initialize application state
    let state = Arc::new(AppState::new(settings)?);

    // Build the router
    let app = routes::create_router(state.clone());

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release pooled upstream connections once the server has drained
    match Arc::try_unwrap(state) {
        Ok(state) => state.forwarder.close(),
        Err(_) => warn!("Forwarder still referenced at shutdown; skipping pool release"),
    }

    info!("Switchboard shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
