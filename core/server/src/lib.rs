//! HTTP surface for PassVault.
//!
//! A thin axum layer over [`passvault_vault::Engine`]: handlers pass the raw
//! `Authorization` header and decoded JSON bodies to the engine and map its
//! errors onto status codes.

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use passvault_common::Result;
use state::AppState;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/auth/signup", post(routes::signup))
        .route("/auth/login", post(routes::login))
        .route(
            "/vault",
            post(routes::create_record).get(routes::list_records),
        )
        .route(
            "/vault/{id}",
            patch(routes::update_record).delete(routes::delete_record),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// # Errors
/// - `Error::Io` if the address cannot be bound or the server fails
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "PassVault server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("PassVault server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
