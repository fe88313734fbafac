// ABOUTME: Shared record types for users, prompt templates, conversations and messages
// ABOUTME: Serialized as camelCase JSON for the HTTP surface
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

// ============================================================================
// Roles
// ============================================================================

/// Access level of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    #[default]
    User,
    /// Administrator allowed to manage prompt templates
    Admin,
}

impl UserRole {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Whether this role grants template management
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(AppError::invalid_input(format!("Unknown role: {other}"))),
        }
    }
}

/// Author of a conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Turn written by the end user
    User,
    /// Turn produced by the language model
    Assistant,
    /// Instruction turn
    System,
}

impl MessageRole {
    /// Storage representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(AppError::invalid_input(format!(
                "Unknown message role: {other}"
            ))),
        }
    }
}

// ============================================================================
// Records
// ============================================================================

/// A registered user, keyed externally by the identity provider's open id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Internal identifier
    pub id: i64,
    /// External identity key, unique
    pub open_id: String,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// How the user last signed in
    pub login_method: Option<String>,
    /// Access level
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
    /// Last successful sign-in
    pub last_signed_in: DateTime<Utc>,
}

/// Fields supplied when creating or refreshing a user record
///
/// `None` fields leave the stored value untouched on update.
#[derive(Debug, Clone, Default)]
pub struct UpsertUser {
    /// External identity key (required)
    pub open_id: String,
    /// Display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Login method
    pub login_method: Option<String>,
    /// Explicit role; `None` keeps the stored role (or `user` on insert)
    pub role: Option<UserRole>,
    /// Sign-in time; defaults to now
    pub last_signed_in: Option<DateTime<Utc>>,
}

/// An administrator-curated system prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    /// Identifier
    pub id: i64,
    /// Title, at most 255 characters
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// System prompt text
    pub content: String,
    /// Creating administrator
    pub created_by: i64,
    /// False once soft-deleted
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a prompt template
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New content
    pub content: Option<String>,
}

impl TemplateUpdate {
    /// True when no field is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.content.is_none()
    }
}

/// A chat session owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Identifier
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Template whose content becomes the system prompt
    pub template_id: Option<i64>,
    /// Title
    pub title: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// One stored turn in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Identifier, monotonic per store
    pub id: i64,
    /// Parent conversation
    pub conversation_id: i64,
    /// Author role
    pub role: MessageRole,
    /// Text
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("system".parse::<MessageRole>().unwrap(), MessageRole::System);
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_template_serializes_camel_case() {
        let template = PromptTemplate {
            id: 1,
            title: "Helper".to_owned(),
            description: None,
            content: "You are helpful.".to_owned(),
            created_by: 7,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&template).unwrap();

        assert_eq!(json["createdBy"], 7);
        assert_eq!(json["isActive"], true);
    }

    #[test]
    fn test_empty_update() {
        assert!(TemplateUpdate::default().is_empty());
        let update = TemplateUpdate {
            title: Some("New".to_owned()),
            ..TemplateUpdate::default()
        };
        assert!(!update.is_empty());
    }
}
