// ABOUTME: SQLite implementation of the storage port
// ABOUTME: Delegates each operation to the per-entity managers in crate::database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{DatabaseProvider, NewTemplate};
use crate::database::Database;
use crate::errors::AppResult;
use crate::models::{
    Conversation, Message, MessageRole, PromptTemplate, TemplateUpdate, UpsertUser, User,
};
use async_trait::async_trait;

/// `SQLite` database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    inner: Database,
}

impl SqliteDatabase {
    /// Connect to `database_url` without running migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the connection fails
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        Ok(Self {
            inner: Database::connect(database_url).await?,
        })
    }

    /// Get a reference to the inner database
    #[must_use]
    pub const fn inner(&self) -> &Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn migrate(&self) -> AppResult<()> {
        self.inner.migrate().await
    }

    async fn upsert_user(&self, user: &UpsertUser) -> AppResult<User> {
        self.inner.users().upsert(user).await
    }

    async fn get_user(&self, user_id: i64) -> Option<User> {
        self.inner.users().get(user_id).await
    }

    async fn get_user_by_open_id(&self, open_id: &str) -> Option<User> {
        self.inner.users().get_by_open_id(open_id).await
    }

    async fn list_active_templates(&self) -> Vec<PromptTemplate> {
        self.inner.templates().list_active().await
    }

    async fn get_template(&self, template_id: i64) -> Option<PromptTemplate> {
        self.inner.templates().get(template_id).await
    }

    async fn create_template(&self, template: &NewTemplate<'_>) -> AppResult<PromptTemplate> {
        self.inner.templates().create(template).await
    }

    async fn update_template(
        &self,
        template_id: i64,
        update: &TemplateUpdate,
    ) -> AppResult<Option<PromptTemplate>> {
        self.inner.templates().update(template_id, update).await
    }

    async fn set_template_active(&self, template_id: i64, is_active: bool) -> AppResult<bool> {
        self.inner.templates().set_active(template_id, is_active).await
    }

    async fn create_conversation(
        &self,
        user_id: i64,
        template_id: Option<i64>,
        title: &str,
    ) -> AppResult<Conversation> {
        self.inner
            .conversations()
            .create(user_id, template_id, title)
            .await
    }

    async fn get_conversation(&self, conversation_id: i64) -> Option<Conversation> {
        self.inner.conversations().get(conversation_id).await
    }

    async fn list_user_conversations(&self, user_id: i64) -> Vec<Conversation> {
        self.inner.conversations().list_for_user(user_id).await
    }

    async fn latest_conversation_for_template(
        &self,
        user_id: i64,
        template_id: i64,
    ) -> Option<Conversation> {
        self.inner
            .conversations()
            .latest_for_template(user_id, template_id)
            .await
    }

    async fn create_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
    ) -> AppResult<Message> {
        self.inner
            .messages()
            .create(conversation_id, role, content)
            .await
    }

    async fn list_messages(&self, conversation_id: i64) -> Vec<Message> {
        self.inner.messages().list(conversation_id).await
    }
}
