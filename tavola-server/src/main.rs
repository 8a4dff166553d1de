//! tavola-server: multi-tenant restaurant ordering API
//!
//! Serves the customer app (public menu and checkout), the store admin panel
//! and the super admin console from one PostgreSQL-backed process.

use std::net::SocketAddr;
use std::time::Duration;

use tavola_server::{AppState, BoxError, Config, build_app, init_logger};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    init_logger(&config.log_level, config.log_json, config.log_dir.as_deref());

    tracing::info!(
        environment = %config.environment,
        base_domain = %config.base_domain,
        "Starting tavola-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = AppState::new(&config).await?;

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP listening on {addr}");

    axum::serve(
        listener,
        build_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
