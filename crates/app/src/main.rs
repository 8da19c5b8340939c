//! Restdoc demo server binary.

use std::net::SocketAddr;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get configuration from environment
    let host = std::env::var("RESTDOC_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("RESTDOC_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .map_err(|e| format!("RESTDOC_PORT must be a valid port number: {e}"))?;

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid listen address {host}:{port}: {e}"))?;

    tracing::info!("Starting restdoc demo v{}", env!("CARGO_PKG_VERSION"));

    restdoc::run_server(addr).await
}
