// ABOUTME: Authorization guard shared by every protected procedure
// ABOUTME: Distinguishes a missing caller (401) from a caller lacking role or ownership (403)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authorization Guard
//!
//! Handlers resolve the caller once and then run these checks in order:
//! authenticated, then role, then ownership. Each check returns the caller on
//! success so it can be threaded into the next.
//!
//! ```rust,no_run
//! use promptdesk_server::middleware::authorization::{require_authenticated, require_role};
//! use promptdesk_server::models::{User, UserRole};
//!
//! fn admin_only(caller: Option<&User>) -> Result<i64, promptdesk_server::errors::AppError> {
//!     let admin = require_role(require_authenticated(caller)?, UserRole::Admin)?;
//!     Ok(admin.id)
//! }
//! ```

use crate::errors::{AppError, AppResult};
use crate::models::{Conversation, User, UserRole};

/// Message used for every conversation access refusal, so a refusal never
/// reveals whether the conversation exists
pub const CONVERSATION_FORBIDDEN: &str = "Conversation not found or not accessible";

/// Require a caller identity
///
/// # Errors
///
/// Returns `AUTH_REQUIRED` when there is no caller
pub fn require_authenticated(caller: Option<&User>) -> AppResult<&User> {
    caller.ok_or_else(AppError::auth_required)
}

/// Require `role` (or a stronger one) on an authenticated caller
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the caller's role is insufficient
pub fn require_role(caller: &User, role: UserRole) -> AppResult<&User> {
    let allowed = match role {
        UserRole::User => true,
        UserRole::Admin => caller.role.is_admin(),
    };
    if allowed {
        Ok(caller)
    } else {
        Err(AppError::forbidden("Admin privileges required"))
    }
}

/// Require that the caller owns a resource owned by `owner_id`
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the ids differ
pub fn require_ownership(caller: &User, owner_id: i64) -> AppResult<&User> {
    if caller.id == owner_id {
        Ok(caller)
    } else {
        Err(AppError::forbidden(CONVERSATION_FORBIDDEN))
    }
}

/// Resolve a looked-up conversation for `caller`, treating a miss and a
/// foreign owner identically
///
/// # Errors
///
/// Returns `PERMISSION_DENIED` when the conversation is absent or belongs to
/// someone else
pub fn require_conversation_access(
    caller: &User,
    conversation: Option<Conversation>,
) -> AppResult<Conversation> {
    let conversation =
        conversation.ok_or_else(|| AppError::forbidden(CONVERSATION_FORBIDDEN))?;
    require_ownership(caller, conversation.user_id)?;
    Ok(conversation)
}
