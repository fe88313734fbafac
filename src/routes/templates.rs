// ABOUTME: Prompt template routes: public catalogue reads and admin-only mutations
// ABOUTME: Handlers resolve the caller and delegate to TemplateService
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{parse_body, parse_id};
use crate::errors::AppError;
use crate::middleware::authorization::require_authenticated;
use crate::models::TemplateUpdate;
use crate::resources::ServerResources;
use crate::services::CreateTemplate;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Prompt template route handlers
pub struct TemplateRoutes;

impl TemplateRoutes {
    /// Create all template routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/prompt-templates",
                get(Self::list_templates).post(Self::create_template),
            )
            .route(
                "/api/prompt-templates/:template_id",
                get(Self::get_template)
                    .put(Self::update_template)
                    .delete(Self::delete_template),
            )
            .with_state(resources)
    }

    async fn list_templates(State(resources): State<Arc<ServerResources>>) -> Response {
        (StatusCode::OK, Json(resources.templates.list().await)).into_response()
    }

    /// Template by id, or `null`; inactive templates stay readable
    async fn get_template(
        State(resources): State<Arc<ServerResources>>,
        Path(template_id): Path<String>,
    ) -> Result<Response, AppError> {
        let template_id = parse_id(&template_id, "template")?;
        let template = resources.templates.get_by_id(template_id).await;
        Ok((StatusCode::OK, Json(template)).into_response())
    }

    async fn create_template(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let request: CreateTemplate = parse_body(&body)?;
        let template = resources
            .templates
            .create(caller.as_ref(), &request)
            .await?;
        Ok((StatusCode::CREATED, Json(template)).into_response())
    }

    async fn update_template(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(template_id): Path<String>,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let template_id = parse_id(&template_id, "template")?;
        let request: TemplateUpdate = parse_body(&body)?;
        let template = resources
            .templates
            .update(caller.as_ref(), template_id, &request)
            .await?;
        Ok((StatusCode::OK, Json(template)).into_response())
    }

    async fn delete_template(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(template_id): Path<String>,
    ) -> Result<Response, AppError> {
        let caller = resources.auth.resolve_caller(&headers).await;
        require_authenticated(caller.as_ref())?;
        let template_id = parse_id(&template_id, "template")?;
        resources
            .templates
            .delete(caller.as_ref(), template_id)
            .await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "success": true }))).into_response())
    }
}
