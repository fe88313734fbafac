// ABOUTME: Conversation record operations scoped to their owning user
// ABOUTME: Creation, lookup, per-user listing and latest-for-template reuse lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{degraded_read, read_error, write_error};
use crate::errors::{AppError, AppResult};
use crate::models::Conversation;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const CONVERSATION_COLUMNS: &str = "id, user_id, template_id, title, created_at, updated_at";

/// Conversation database operations
pub struct ConversationManager {
    pool: SqlitePool,
}

impl ConversationManager {
    /// Create a new conversation manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a conversation owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the user or template does not exist and
    /// `STORAGE_UNAVAILABLE` if the write fails
    pub async fn create(
        &self,
        user_id: i64,
        template_id: Option<i64>,
        title: &str,
    ) -> AppResult<Conversation> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO conversations (user_id, template_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(user_id)
        .bind(template_id)
        .bind(title)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to create conversation"))?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            user_id,
            template_id,
            title: title.to_owned(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a conversation by id without any ownership filter
    pub async fn get(&self, conversation_id: i64) -> Option<Conversation> {
        let result = async {
            let row = sqlx::query(&format!(
                "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
            ))
            .bind(conversation_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to get conversation"))?;
            row.as_ref().map(row_to_conversation).transpose()
        }
        .await;
        degraded_read("Conversation lookup failed", result)
    }

    /// List a user's conversations, newest first
    pub async fn list_for_user(&self, user_id: i64) -> Vec<Conversation> {
        let result = async {
            let rows = sqlx::query(&format!(
                r"
                SELECT {CONVERSATION_COLUMNS} FROM conversations
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                "
            ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list conversations"))?;
            rows.iter().map(row_to_conversation).collect::<AppResult<Vec<_>>>()
        }
        .await;
        degraded_read("Listing conversations failed", result)
    }

    /// Newest conversation the user holds for `template_id`
    pub async fn latest_for_template(
        &self,
        user_id: i64,
        template_id: i64,
    ) -> Option<Conversation> {
        let result = async {
            let row = sqlx::query(&format!(
                r"
                SELECT {CONVERSATION_COLUMNS} FROM conversations
                WHERE user_id = $1 AND template_id = $2
                ORDER BY id DESC
                LIMIT 1
                "
            ))
            .bind(user_id)
            .bind(template_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error("Failed to find latest conversation for template"))?;
            row.as_ref().map(row_to_conversation).transpose()
        }
        .await;
        degraded_read("Latest conversation lookup failed", result)
    }
}

fn row_to_conversation(row: &SqliteRow) -> AppResult<Conversation> {
    let decode = |e: sqlx::Error| AppError::internal(format!("Malformed conversation row: {e}"));
    Ok(Conversation {
        id: row.try_get("id").map_err(decode)?,
        user_id: row.try_get("user_id").map_err(decode)?,
        template_id: row.try_get("template_id").map_err(decode)?,
        title: row.try_get("title").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
    })
}
