// ABOUTME: Storage port used by the services and routes
// ABOUTME: Object-safe async trait so the store is injected as Arc<dyn DatabaseProvider>
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::models::{
    Conversation, Message, MessageRole, PromptTemplate, TemplateUpdate, UpsertUser, User,
};
use async_trait::async_trait;

pub use crate::database::templates::NewTemplate;

/// Store selection from a connection URL
pub mod factory;
/// `SQLite` implementation
pub mod sqlite;

/// Core database abstraction
///
/// Reads return empty results when the store is unreachable; writes return
/// `STORAGE_UNAVAILABLE`. Absence is never an error.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Create the schema if it does not exist
    async fn migrate(&self) -> AppResult<()>;

    // ================================
    // Users
    // ================================

    /// Insert or refresh a user by open id
    async fn upsert_user(&self, user: &UpsertUser) -> AppResult<User>;

    /// Get user by internal id
    async fn get_user(&self, user_id: i64) -> Option<User>;

    /// Get user by external identity
    async fn get_user_by_open_id(&self, open_id: &str) -> Option<User>;

    // ================================
    // Prompt templates
    // ================================

    /// Active templates only
    async fn list_active_templates(&self) -> Vec<PromptTemplate>;

    /// Template by id, active or not
    async fn get_template(&self, template_id: i64) -> Option<PromptTemplate>;

    /// Insert an active template
    async fn create_template(&self, template: &NewTemplate<'_>) -> AppResult<PromptTemplate>;

    /// Partial update; `None` when the id is unknown
    async fn update_template(
        &self,
        template_id: i64,
        update: &TemplateUpdate,
    ) -> AppResult<Option<PromptTemplate>>;

    /// Toggle the active flag; false when the id is unknown
    async fn set_template_active(&self, template_id: i64, is_active: bool) -> AppResult<bool>;

    // ================================
    // Conversations
    // ================================

    /// Insert a conversation
    async fn create_conversation(
        &self,
        user_id: i64,
        template_id: Option<i64>,
        title: &str,
    ) -> AppResult<Conversation>;

    /// Conversation by id, unfiltered
    async fn get_conversation(&self, conversation_id: i64) -> Option<Conversation>;

    /// Conversations owned by a user, newest first
    async fn list_user_conversations(&self, user_id: i64) -> Vec<Conversation>;

    /// The user's newest conversation bound to a template
    async fn latest_conversation_for_template(
        &self,
        user_id: i64,
        template_id: i64,
    ) -> Option<Conversation>;

    // ================================
    // Messages
    // ================================

    /// Append a message
    async fn create_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> AppResult<Message>;

    /// Messages of a conversation in insertion order
    async fn list_messages(&self, conversation_id: i64) -> Vec<Message>;
}
