// ABOUTME: User record operations keyed by the external identity (open id)
// ABOUTME: Insert-or-update on sign-in plus lookups by internal id and open id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{degraded_read, read_error, write_error};
use crate::errors::{AppError, AppResult};
use crate::models::{UpsertUser, User, UserRole};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str =
    "id, open_id, name, email, login_method, role, created_at, updated_at, last_signed_in";

/// User database operations
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user or refresh the existing row with the same open id
    ///
    /// Only fields that are `Some` overwrite stored values; `role` is left
    /// untouched on update unless given. Exactly one row exists per open id
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_INPUT` for an empty open id and `STORAGE_UNAVAILABLE`
    /// if the write fails
    pub async fn upsert(&self, user: &UpsertUser) -> AppResult<User> {
        if user.open_id.trim().is_empty() {
            return Err(AppError::invalid_input("User open id is required for upsert"));
        }

        let now = Utc::now();
        let last_signed_in = user.last_signed_in.unwrap_or(now);

        sqlx::query(
            r"
            INSERT INTO users (open_id, name, email, login_method, role, created_at, updated_at, last_signed_in)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'user'), $6, $6, $7)
            ON CONFLICT(open_id) DO UPDATE SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                login_method = COALESCE($4, login_method),
                role = COALESCE($5, role),
                updated_at = $6,
                last_signed_in = $7
            ",
        )
        .bind(&user.open_id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.login_method)
        .bind(user.role.map(UserRole::as_str))
        .bind(now)
        .bind(last_signed_in)
        .execute(&self.pool)
        .await
        .map_err(write_error("Failed to upsert user"))?;

        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE open_id = $1"))
            .bind(&user.open_id)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error("Failed to reload upserted user"))?;

        row_to_user(&row)
    }

    /// Get a user by internal id
    pub async fn get(&self, user_id: i64) -> Option<User> {
        let result = async {
            let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(read_error("Failed to get user"))?;
            row.as_ref().map(row_to_user).transpose()
        }
        .await;
        degraded_read("User lookup failed", result)
    }

    /// Get a user by external identity
    pub async fn get_by_open_id(&self, open_id: &str) -> Option<User> {
        let result = async {
            let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE open_id = $1"))
                .bind(open_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(read_error("Failed to get user by open id"))?;
            row.as_ref().map(row_to_user).transpose()
        }
        .await;
        degraded_read("User lookup by open id failed", result)
    }
}

fn row_to_user(row: &SqliteRow) -> AppResult<User> {
    let decode = |e: sqlx::Error| AppError::internal(format!("Malformed user row: {e}"));
    let role: String = row.try_get("role").map_err(decode)?;
    Ok(User {
        id: row.try_get("id").map_err(decode)?,
        open_id: row.try_get("open_id").map_err(decode)?,
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
        login_method: row.try_get("login_method").map_err(decode)?,
        role: role.parse()?,
        created_at: row.try_get("created_at").map_err(decode)?,
        updated_at: row.try_get("updated_at").map_err(decode)?,
        last_signed_in: row.try_get("last_signed_in").map_err(decode)?,
    })
}
