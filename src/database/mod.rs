// ABOUTME: SQLite persistence for users, prompt templates, conversations and messages
// ABOUTME: Owns the pool, the in-code schema migrations and the read/write failure policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database
//!
//! Each entity has its own manager holding a clone of the pool. Two failure
//! rules apply everywhere:
//!
//! - reads never fail the caller: a store error is logged at `warn` and the
//!   read yields an empty list or `None`
//! - writes fail hard with `STORAGE_UNAVAILABLE`, except foreign-key
//!   violations which are the caller's fault and map to `INVALID_INPUT`

/// Conversation records
pub mod conversations;
/// Message records
pub mod messages;
/// Prompt template records
pub mod templates;
/// User records
pub mod users;

pub use conversations::ConversationManager;
pub use messages::MessageManager;
pub use templates::TemplateManager;
pub use users::UserManager;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{info, warn};

/// Handle over the SQLite pool with one manager per entity
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open a pool for `database_url`, creating the file if missing
    ///
    /// In-memory URLs get a single connection that is never recycled, so
    /// every handle sees the same data.
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` for an unparsable URL and `STORAGE_UNAVAILABLE`
    /// when the connection cannot be opened
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid DATABASE_URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await
        }
        .map_err(|e| {
            AppError::storage_unavailable(format!("Failed to open database: {e}")).with_source(e)
        })?;

        Ok(Self { pool })
    }

    /// Close every connection; later reads degrade and writes fail
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// User manager
    #[must_use]
    pub fn users(&self) -> UserManager {
        UserManager::new(self.pool.clone())
    }

    /// Prompt template manager
    #[must_use]
    pub fn templates(&self) -> TemplateManager {
        TemplateManager::new(self.pool.clone())
    }

    /// Conversation manager
    #[must_use]
    pub fn conversations(&self) -> ConversationManager {
        ConversationManager::new(self.pool.clone())
    }

    /// Message manager
    #[must_use]
    pub fn messages(&self) -> MessageManager {
        MessageManager::new(self.pool.clone())
    }

    /// Create all tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns `STORAGE_UNAVAILABLE` if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        info!("Running database migrations");
        self.migrate_users().await?;
        self.migrate_templates().await?;
        self.migrate_conversations().await?;
        self.migrate_messages().await?;
        info!("Database migrations complete");
        Ok(())
    }

    async fn run_schema(&self, statements: &[&str]) -> AppResult<()> {
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(write_error("Failed to apply schema"))?;
        }
        Ok(())
    }

    async fn migrate_users(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                open_id TEXT NOT NULL UNIQUE,
                name TEXT,
                email TEXT,
                login_method TEXT,
                role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                last_signed_in TEXT NOT NULL
            )
            ",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_open_id ON users(open_id)",
        ])
        .await
    }

    async fn migrate_templates(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS prompt_templates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                content TEXT NOT NULL,
                created_by INTEGER NOT NULL REFERENCES users(id),
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_prompt_templates_created_by ON prompt_templates(created_by)",
            "CREATE INDEX IF NOT EXISTS idx_prompt_templates_active ON prompt_templates(is_active)",
        ])
        .await
    }

    async fn migrate_conversations(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                template_id INTEGER REFERENCES prompt_templates(id),
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id)",
            "CREATE INDEX IF NOT EXISTS idx_conversations_template ON conversations(template_id)",
        ])
        .await
    }

    async fn migrate_messages(&self) -> AppResult<()> {
        self.run_schema(&[
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id INTEGER NOT NULL REFERENCES conversations(id),
                role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id)",
        ])
        .await
    }
}

// ============================================================================
// Failure policy
// ============================================================================

/// Map a write-path `sqlx::Error` to an `AppError`
pub(crate) fn write_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        let foreign_key = e
            .as_database_error()
            .is_some_and(|db_err| db_err.is_foreign_key_violation());
        if foreign_key {
            AppError::invalid_input(format!("{context}: referenced record does not exist"))
        } else {
            AppError::storage_unavailable(format!("{context}: {e}")).with_source(e)
        }
    }
}

/// Collapse a failed read into its empty value, logging the cause
pub(crate) fn degraded_read<T: Default>(context: &'static str, result: AppResult<T>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "{context}; returning empty result");
        T::default()
    })
}

/// Map a read-path `sqlx::Error` before it is degraded
pub(crate) fn read_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| AppError::storage_unavailable(format!("{context}: {e}")).with_source(e)
}
