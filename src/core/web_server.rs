//! Liveness endpoint for the hosting platform.
//!
//! Exposes a single `GET /health` route returning `200 ok`. It exists only
//! to satisfy the platform's health checks and shares no mutable state with
//! the bot beyond process-wide configuration.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Start the health-check server. Runs until the process exits.
pub async fn start_health_server(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let app = Router::new().route("/health", get(health_handler));

    log::info!("Starting health endpoint on http://{}/health", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health — simple health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
