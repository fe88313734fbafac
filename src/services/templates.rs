// ABOUTME: Prompt template lifecycle: public listing and admin-only create, update and soft delete
// ABOUTME: Enforces the admin guard and input validation before any write reaches the store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::constants::limits::MAX_TITLE_CHARS;
use crate::database_plugins::{DatabaseProvider, NewTemplate};
use crate::errors::{AppError, AppResult};
use crate::middleware::authorization::{require_authenticated, require_role};
use crate::models::{PromptTemplate, TemplateUpdate, User, UserRole};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for a new template
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    /// Title, 1 to 255 characters
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// System prompt text
    pub content: String,
}

/// Template lifecycle operations
#[derive(Clone)]
pub struct TemplateService {
    database: Arc<dyn DatabaseProvider>,
}

impl TemplateService {
    /// Create a service over `database`
    #[must_use]
    pub fn new(database: Arc<dyn DatabaseProvider>) -> Self {
        Self { database }
    }

    /// Active templates; open to anyone
    pub async fn list(&self) -> Vec<PromptTemplate> {
        self.database.list_active_templates().await
    }

    /// Template by id whether active or not; open to anyone
    pub async fn get_by_id(&self, template_id: i64) -> Option<PromptTemplate> {
        self.database.get_template(template_id).await
    }

    /// Create an active template owned by the calling admin
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED` without a caller, `PERMISSION_DENIED` for non-admins,
    /// `INVALID_INPUT` on validation failure, `STORAGE_UNAVAILABLE` if the
    /// write fails
    pub async fn create(
        &self,
        caller: Option<&User>,
        input: &CreateTemplate,
    ) -> AppResult<PromptTemplate> {
        let admin = require_role(require_authenticated(caller)?, UserRole::Admin)?;
        validate_title(&input.title)?;
        validate_content(&input.content)?;

        let template = self
            .database
            .create_template(&NewTemplate {
                title: input.title.trim(),
                description: input.description.as_deref(),
                content: &input.content,
                created_by: admin.id,
            })
            .await?;

        info!(template_id = template.id, admin_id = admin.id, "Prompt template created");
        Ok(template)
    }

    /// Apply a partial update
    ///
    /// # Errors
    ///
    /// As [`Self::create`], plus `RESOURCE_NOT_FOUND` for an unknown id
    pub async fn update(
        &self,
        caller: Option<&User>,
        template_id: i64,
        update: &TemplateUpdate,
    ) -> AppResult<PromptTemplate> {
        let admin = require_role(require_authenticated(caller)?, UserRole::Admin)?;
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        if let Some(content) = &update.content {
            validate_content(content)?;
        }
        if update.is_empty() {
            return self
                .database
                .get_template(template_id)
                .await
                .ok_or_else(|| AppError::not_found(format!("Prompt template {template_id}")));
        }

        let normalized = TemplateUpdate {
            title: update.title.as_deref().map(|t| t.trim().to_owned()),
            ..update.clone()
        };
        let template = self
            .database
            .update_template(template_id, &normalized)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Prompt template {template_id}")))?;

        info!(template_id, admin_id = admin.id, "Prompt template updated");
        Ok(template)
    }

    /// Soft delete: the template leaves listings but stays readable by id
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED`, `PERMISSION_DENIED`, `RESOURCE_NOT_FOUND` for an
    /// unknown id, `STORAGE_UNAVAILABLE` if the write fails
    pub async fn delete(&self, caller: Option<&User>, template_id: i64) -> AppResult<()> {
        let admin = require_role(require_authenticated(caller)?, UserRole::Admin)?;

        if !self.database.set_template_active(template_id, false).await? {
            return Err(AppError::not_found(format!("Prompt template {template_id}")));
        }

        info!(template_id, admin_id = admin.id, "Prompt template deactivated");
        Ok(())
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::invalid_input(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> AppResult<()> {
    if content.trim().is_empty() {
        return Err(AppError::invalid_input("Content must not be empty"));
    }
    Ok(())
}

/// Shared with conversation titles
pub(crate) fn validate_conversation_title(title: &str) -> AppResult<()> {
    validate_title(title)
}
