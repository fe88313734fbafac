// ABOUTME: Prompt template record operations with soft deletion
// ABOUTME: Inactive templates disappear from listings but stay readable by id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{degraded_read, read_error, write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{PromptTemplate, TemplateUpdate};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const TEMPLATE_COLUMNS: &str =
    "id, title, description, content, created_by, is_active, created_at, updated_at";

/// Fields for a new prompt template
#[derive(Debug, Clone)]
pub struct NewTemplate<'a> {
    /// Title
    pub title: &'a str,
    /// Optional description
    pub description: Option<&'a str>,
    /// System prompt text
    pub content: &'a str,
    /// Creating administrator
    pub created_by: i64,
}

/// Prompt template database operations
pub struct TemplateManager {
    pool: SqlitePool,
}

impl TemplateManager {
    /// Create a new template manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List templates with `is_active` set, oldest first
    pub async fn list_active(&self) -> Vec<PromptTemplate> {
        let result = async {
            let rows = sqlx::query(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM prompt_templates WHERE is_active = 1 ORDER BY id ASC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list prompt templates"))?;
            rows.iter().map(row_to_template).collect::<AppResult<Vec<_>>>()
        }
        .await;
        degraded_read("Listing prompt templates failed", result)
    }

    /// Get a template by id regardless of its active flag
    pub async fn get(&self, template_id: i64) -> Option<PromptTemplate> {
        let result = async {
            let row = sqlx::query(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM prompt_templates WHERE id = $1"
            ))
            .bind(template_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to get prompt template"))?;
            row.as_ref().map(row_to_template).transpose()
        }
        .await;
        degraded_read("Prompt template lookup failed", result)
    }

    /// Insert an active template
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` if `created_by` names no user and
    /// `STORAGE_UNAVAILABLE` if the write fails
    pub async fn create(&self, template: &NewTemplate<'_>) -> AppResult<PromptTemplate> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO prompt_templates (title, description, content, created_by, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 1, $5, $5)
            ",
        )
        .bind(template.title)
        .bind(template.description)
        .bind(template.content)
        .bind(template.created_by)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to create prompt template"))?;

        Ok(PromptTemplate {
            id: result.last_insert_rowid(),
            title: template.title.to_owned(),
            description: template.description.map(ToOwned::to_owned),
            content: template.content.to_owned(),
            created_by: template.created_by,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the supplied fields of `update`, leaving the rest unchanged
    ///
    /// Returns `None` when no template has this id.
    ///
    /// # Errors
    ///
    /// Returns `STORAGE_UNAVAILABLE` if the write fails
    pub async fn update(
        &self,
        template_id: i64,
        update: &TemplateUpdate,
    ) -> AppResult<Option<PromptTemplate>> {
        let result = sqlx::query(
            r"
            UPDATE prompt_templates SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                content = COALESCE($3, content),
                updated_at = $4
            WHERE id = $5
            ",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.content)
        .bind(Utc::now())
        .bind(template_id)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to update prompt template"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.reload(template_id).await.map(Some)
    }

    /// Set or clear the active flag; returns false when no template has this id
    ///
    /// # Errors
    ///
    /// Returns `STORAGE_UNAVAILABLE` if the write fails
    pub async fn set_active(&self, template_id: i64, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE prompt_templates SET is_active = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(is_active)
        .bind(Utc::now())
        .bind(template_id)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to change prompt template state"))?;

        Ok(result.rows_affected() > 0)
    }

    /// Read back a row inside a write path, where failure is a hard error
    async fn reload(&self, template_id: i64) -> AppResult<PromptTemplate> {
        let row = sqlx::query(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM prompt_templates WHERE id = $1"
        ))
        .bind(template_id)
        .fetch_one(&self.pool)
        .await
        .map_err(write_error("Failed to reload prompt template"))?;
        row_to_template(&row)
    }
}

fn row_to_template(row: &SqliteRow) -> AppResult<PromptTemplate> {
    let decode = |e: sqlx::Error| AppError::internal(format!("Malformed prompt template row: {e}"));
    Ok(PromptTemplate {
        id: row.try_get("id").map_err(decode)?,
        title: row.try_get("title").map_err(decode)?,
        description: row.try_get("description").map_err(decode)?,
        content: row.try_get("content").map_err(decode)?,
        created_by: row.try_get("created_by").map_err(decode)?,
        is_active: row.try_get("is_active").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}
