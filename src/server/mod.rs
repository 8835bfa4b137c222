//! Inbound HTTP surface.
//!
//! | Method | Path             | Operation                |
//! |--------|------------------|--------------------------|
//! | POST   | `/api/search`    | [`Gateway::search`]      |
//! | POST   | `/api/doc/:docId`| [`Gateway::document`]    |
//! | GET    | `/health`        | liveness + token status  |

mod handlers;
mod middleware;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::gateway::{ApiError, Gateway};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// Build the router with logging and CORS applied to every route
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(handlers::search))
        .route("/api/doc/:doc_id", post(handlers::document))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::cors))
        .layer(axum::middleware::from_fn(middleware::request_logging))
}

/// Bind `addr` and serve in a background task.
///
/// Returns the bound address (useful with port 0) and the server task.
pub async fn start(addr: &str, gateway: Gateway) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    let app = build_router(AppState::new(gateway));

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server task failed: {}", e);
        }
    });
    Ok((bound, handle))
}

/// Serve on `addr` until Ctrl-C
pub async fn serve(addr: &str, gateway: Gateway) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        "Proxy server running on {} (upstream: {})",
        listener.local_addr()?,
        gateway.upstream_name()
    );

    axum::serve(listener, build_router(AppState::new(gateway)))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, draining connections"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
