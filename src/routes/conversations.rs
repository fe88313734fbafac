// ABOUTME: Conversation and message routes for the signed-in user
// ABOUTME: Ownership checks and the send pipeline live in ConversationOrchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Conversation routes
//!
//! Every handler requires a session. A conversation that does not exist and
//! one owned by somebody else produce the same `403` response.

use super::{parse_body, parse_id};
use crate::errors::AppError;
use crate::middleware::authorization::require_authenticated;
use crate::resources::ServerResources;
use crate::services::NewConversation;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// Request to send a message
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Message text
    pub content: String,
}

/// Conversation route handlers
pub struct ConversationRoutes;

impl ConversationRoutes {
    /// Create all conversation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/conversations",
                get(Self::list_conversations).post(Self::create_conversation),
            )
            .route(
                "/api/conversations/:conversation_id",
                get(Self::get_conversation),
            )
            .route(
                "/api/conversations/:conversation_id/messages",
                get(Self::get_messages).post(Self::send_message),
            )
            .with_state(resources)
    }

    async fn list_conversations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        let conversations = resources
            .orchestrator
            .list_conversations(caller.as_ref())
            .await?;
        Ok((StatusCode::OK, Json(conversations)).into_response())
    }

    async fn create_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let request: NewConversation = parse_body(&body)?;
        let conversation = resources
            .orchestrator
            .create_conversation(caller.as_ref(), &request)
            .await?;
        Ok((StatusCode::CREATED, Json(conversation)).into_response())
    }

    async fn get_conversation(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let conversation_id = parse_id(&conversation_id, "conversation")?;
        let conversation = resources
            .orchestrator
            .get_conversation(caller.as_ref(), conversation_id)
            .await?;
        Ok((StatusCode::OK, Json(conversation)).into_response())
    }

    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let conversation_id = parse_id(&conversation_id, "conversation")?;
        let messages = resources
            .orchestrator
            .list_messages(caller.as_ref(), conversation_id)
            .await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }

    async fn send_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(conversation_id): Path<String>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let conversation_id = parse_id(&conversation_id, "conversation")?;
        let request: SendMessageRequest = parse_body(&body)?;
        let outcome = resources
            .orchestrator
            .send_message(caller.as_ref(), conversation_id, &request.content)
            .await?;
        Ok((StatusCode::OK, Json(outcome)).into_response())
    }
}
