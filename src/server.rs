// ABOUTME: HTTP server assembly: router plus CORS, tracing and request-id layers
// ABOUTME: Binds the configured port and serves until Ctrl-C
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use crate::middleware::cors::setup_cors;
use crate::middleware::tracing::{propagate_request_id_layer, set_request_id_layer, trace_layer};
use crate::resources::ServerResources;
use crate::routes::api_router;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{info, warn};

/// Full application router with every HTTP layer applied
pub fn build_router(resources: &Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors_origins);

    api_router(resources).layer(
        ServiceBuilder::new()
            .layer(set_request_id_layer())
            .layer(trace_layer())
            .layer(propagate_request_id_layer())
            .layer(cors),
    )
}

/// Serve on `0.0.0.0:<http_port>` until Ctrl-C
///
/// # Errors
///
/// Returns an internal error if the port cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let router = build_router(&resources);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutdown signal received");
}
