// ABOUTME: Session routes: who am I and logout
// ABOUTME: The sign-in handshake itself happens outside this service and lands in AuthService::complete_login
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::session::COOKIE_NAME;
use crate::resources::ServerResources;
use crate::security::cookies::expired_cookie;
use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::info;

/// Session route handlers
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/me", get(Self::me))
            .route("/api/auth/logout", post(Self::logout))
            .with_state(resources)
    }

    /// The current user, or `null` when the request carries no valid session
    async fn me(State(resources): State<Arc<ServerResources>>, headers: HeaderMap) -> Response {
        let caller = resources.auth.resolve_caller(&headers).await;
        (StatusCode::OK, Json(caller)).into_response()
    }

    /// Expire the session cookie; always succeeds
    async fn logout(State(resources): State<Arc<ServerResources>>, headers: HeaderMap) -> Response {
        if let Some(user) = resources.auth.resolve_caller(&headers).await {
            info!(user_id = user.id, "User logged out");
        }

        let secure = resources.config.environment.is_production();
        (
            StatusCode::OK,
            [(SET_COOKIE, expired_cookie(COOKIE_NAME, secure))],
            Json(serde_json::json!({ "success": true })),
        )
            .into_response()
    }
}
