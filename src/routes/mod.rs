// ABOUTME: Route module organization for the promptdesk HTTP endpoints
// ABOUTME: Each domain module holds thin handlers that resolve the caller and delegate to services
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! HTTP routes grouped by domain
//!
//! Handlers never touch the store directly; they resolve the caller from the
//! request headers and hand it to the matching service. Protected handlers
//! check for a session before parsing path ids or bodies.

/// Session inspection and logout
pub mod auth;
/// Conversations and messages
pub mod conversations;
/// Liveness endpoint
pub mod health;
/// Prompt template catalogue and admin mutations
pub mod templates;

pub use auth::AuthRoutes;
pub use conversations::ConversationRoutes;
pub use health::HealthRoutes;
pub use templates::TemplateRoutes;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;
use axum::Router;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// All API routes, without the HTTP layers
pub fn api_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes())
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(TemplateRoutes::routes(resources.clone()))
        .merge(ConversationRoutes::routes(resources.clone()))
}

/// Parse a numeric path id, rejecting anything else as `INVALID_INPUT`
pub(crate) fn parse_id(raw: &str, what: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::invalid_input(format!("Invalid {what} id: {raw}")))
}

/// Decode a JSON request body, reporting malformed input as `INVALID_INPUT`
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("Invalid request body: {e}")))
}
