// ABOUTME: Database factory selecting a storage implementation from the connection URL
// ABOUTME: Opens, migrates and returns the store as a shared trait object
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// File-backed `SQLite`
    SQLite,
    /// `SQLite` held in memory for the lifetime of the process
    SQLiteMemory,
}

/// Detect the database type from a connection string
///
/// # Errors
///
/// Returns `CONFIG_ERROR` for any scheme other than `sqlite:`
pub fn detect_database_type(database_url: &str) -> AppResult<DatabaseType> {
    if !database_url.starts_with("sqlite:") {
        return Err(AppError::config(format!(
            "Unsupported database URL '{database_url}': only sqlite: URLs are supported"
        )));
    }
    if database_url.contains(":memory:") || database_url.contains("mode=memory") {
        Ok(DatabaseType::SQLiteMemory)
    } else {
        Ok(DatabaseType::SQLite)
    }
}

/// Open the store for `database_url` and bring its schema up to date
///
/// # Errors
///
/// Returns an error if the URL is unsupported, the connection fails, or a
/// migration fails
pub async fn open_database(database_url: &str) -> AppResult<Arc<dyn DatabaseProvider>> {
    let db_type = detect_database_type(database_url)?;
    debug!(?db_type, "Detected database type");
    if db_type == DatabaseType::SQLite {
        ensure_parent_dir(database_url)?;
    }

    let database = SqliteDatabase::connect(database_url).await?;
    database.migrate().await?;
    info!(?db_type, "Database ready");

    Ok(Arc::new(database))
}

/// Create the directory holding a file database
fn ensure_parent_dir(database_url: &str) -> AppResult<()> {
    let path = database_url
        .trim_start_matches("sqlite:")
        .trim_start_matches("//")
        .split('?')
        .next()
        .unwrap_or_default();
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| {
                AppError::storage_unavailable(format!(
                    "Failed to create database directory {}: {e}",
                    parent.display()
                ))
            }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_detect_database_type() {
        assert_eq!(
            detect_database_type("sqlite::memory:").unwrap(),
            DatabaseType::SQLiteMemory
        );
        assert_eq!(
            detect_database_type("sqlite:./data/promptdesk.db").unwrap(),
            DatabaseType::SQLite
        );
        assert_eq!(
            detect_database_type("postgres://localhost/db").unwrap_err().code,
            ErrorCode::ConfigError
        );
    }

    #[tokio::test]
    async fn test_open_in_memory_database() {
        let database = open_database("sqlite::memory:").await.unwrap();
        assert!(database.list_active_templates().await.is_empty());
    }
}
