//! TickerBot Relay - interactions webhook receiver.
//!
//! This binary provides a thin, fast web server that:
//! - Receives interaction callbacks from the platform
//! - Verifies their detached Ed25519 signatures
//! - Answers liveness pings inline
//! - Immediately acknowledges everything else and forwards the raw payload
//!   to the FIFO queue in the background
//!
//! All command processing happens in the downstream queue consumer.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tickerbot::web::router;
use tickerbot::{AppState, Config, Forwarder};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("relay_starting");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        port = config.port,
        region = %config.aws_region,
        queue_url_length = config.queue_url.len(),
        "config_loaded"
    );

    // Create the queue forwarder
    let forwarder = Forwarder::new(&config).context("Failed to create queue forwarder")?;
    info!("forwarder_created");

    // Create application state and router
    let state = AppState::new(config.clone(), forwarder);
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("relay_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("relay_shutting_down");
}
