// ABOUTME: Append-only message record operations
// ABOUTME: History is replayed in insertion (rowid) order for prompt assembly
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{degraded_read, read_error, write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{Message, MessageRole};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// Message database operations
pub struct MessageManager {
    pool: SqlitePool,
}

impl MessageManager {
    /// Create a new message manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message to a conversation
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` when the conversation does not exist and
    /// `STORAGE_UNAVAILABLE` if the write fails
    pub async fn create(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> AppResult<Message> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO messages (conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to create message"))?;

        Ok(Message {
            id: result.last_insert_rowid(),
            conversation_id,
            role,
            content: content.to_owned(),
            created_at: now,
        })
    }

    /// All messages of a conversation in insertion order
    pub async fn list(&self, conversation_id: i64) -> Vec<Message> {
        let result = async {
            let rows = sqlx::query(
                r"
                SELECT id, conversation_id, role, content, created_at
                FROM messages
                WHERE conversation_id = $1
                ORDER BY id ASC
                ",
            )
            .bind(conversation_id)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error("Failed to list messages"))?;
            rows.iter().map(row_to_message).collect::<AppResult<Vec<_>>>()
        }
        .await;
        degraded_read("Listing messages failed", result)
    }
}

fn row_to_message(row: &SqliteRow) -> AppResult<Message> {
    let decode = |e: sqlx::Error| AppError::internal(format!("Malformed message row: {e}"));
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(Message {
        id: row.try_get("id").map_err(decode)?,
        conversation_id: row.try_get("conversation_id").map_err(decode)?,
        role: role.parse()?,
        content: row.try_get("content").map_err(decode)?,
        created_at: row.try_get("created_at").map_err(decode)?,
    })
}
