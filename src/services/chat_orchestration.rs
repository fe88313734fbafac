// ABOUTME: Conversation orchestration: ownership-checked reads and the send-message pipeline
// ABOUTME: Persists the user turn, assembles the prompt, calls the model and stores the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Orchestrator
//!
//! `send_message` runs four steps in order and is not atomic:
//!
//! 1. check the caller owns the conversation
//! 2. persist the user turn
//! 3. replay history (plus the template's content as the system turn) to the model
//! 4. persist the assistant turn and return its content
//!
//! When step 3 fails the user turn stays stored and no assistant turn is
//! written.

use crate::constants::chat::FALLBACK_REPLY;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult};
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::middleware::authorization::{require_authenticated, require_conversation_access};
use crate::models::{Conversation, Message, MessageRole, User};
use crate::services::templates::validate_conversation_title;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, field, info, instrument, warn, Span};

/// What `create_conversation` does when the caller already has a
/// conversation for the same template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationStartPolicy {
    /// Every call creates a new conversation
    #[default]
    AlwaysCreate,
    /// Return the caller's newest conversation for the template if one exists
    ReuseLatest,
}

impl FromStr for ConversationStartPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "always-create" => Ok(Self::AlwaysCreate),
            "reuse-latest" => Ok(Self::ReuseLatest),
            other => Err(AppError::config(format!(
                "Unknown conversation start policy '{other}' (expected always-create or reuse-latest)"
            ))),
        }
    }
}

impl fmt::Display for ConversationStartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlwaysCreate => "always-create",
            Self::ReuseLatest => "reuse-latest",
        })
    }
}

/// Input for a new conversation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    /// Template whose content becomes the system prompt
    pub template_id: Option<i64>,
    /// Title
    pub title: String,
}

/// Reply returned by `send_message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    /// Assistant content exactly as stored
    pub content: String,
}

/// Conversation and message operations for an authenticated caller
#[derive(Clone)]
pub struct ConversationOrchestrator {
    database: Arc<dyn DatabaseProvider>,
    llm: Arc<dyn LlmProvider>,
    policy: ConversationStartPolicy,
}

impl ConversationOrchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(
        database: Arc<dyn DatabaseProvider>,
        llm: Arc<dyn LlmProvider>,
        policy: ConversationStartPolicy,
    ) -> Self {
        Self {
            database,
            llm,
            policy,
        }
    }

    /// Create (or, under `ReuseLatest`, reuse) a conversation for the caller
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED` without a caller, `INVALID_INPUT` for an empty title or
    /// unknown template, `STORAGE_UNAVAILABLE` if the write fails
    pub async fn create_conversation(
        &self,
        caller: Option<&User>,
        input: &NewConversation,
    ) -> AppResult<Conversation> {
        let user = require_authenticated(caller)?;
        validate_conversation_title(&input.title)?;

        if let (ConversationStartPolicy::ReuseLatest, Some(template_id)) =
            (self.policy, input.template_id)
        {
            if let Some(existing) = self
                .database
                .latest_conversation_for_template(user.id, template_id)
                .await
            {
                info!(
                    user_id = user.id,
                    conversation_id = existing.id,
                    template_id,
                    "Reusing latest conversation for template"
                );
                return Ok(existing);
            }
        }

        let conversation = self
            .database
            .create_conversation(user.id, input.template_id, input.title.trim())
            .await?;
        info!(
            user_id = user.id,
            conversation_id = conversation.id,
            template_id = ?input.template_id,
            "Conversation created"
        );
        Ok(conversation)
    }

    /// The caller's conversations
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED` without a caller
    pub async fn list_conversations(&self, caller: Option<&User>) -> AppResult<Vec<Conversation>> {
        let user = require_authenticated(caller)?;
        Ok(self.database.list_user_conversations(user.id).await)
    }

    /// One of the caller's conversations
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED` without a caller; `PERMISSION_DENIED` when the
    /// conversation is missing or foreign
    pub async fn get_conversation(
        &self,
        caller: Option<&User>,
        conversation_id: i64,
    ) -> AppResult<Conversation> {
        let user = require_authenticated(caller)?;
        self.owned_conversation(user, conversation_id).await
    }

    /// Messages of one of the caller's conversations in creation order
    ///
    /// # Errors
    ///
    /// As [`Self::get_conversation`]
    pub async fn list_messages(
        &self,
        caller: Option<&User>,
        conversation_id: i64,
    ) -> AppResult<Vec<Message>> {
        let user = require_authenticated(caller)?;
        self.owned_conversation(user, conversation_id).await?;
        Ok(self.database.list_messages(conversation_id).await)
    }

    /// Send a user message and return the stored assistant reply
    ///
    /// # Errors
    ///
    /// `AUTH_REQUIRED`, `PERMISSION_DENIED` for a missing or foreign
    /// conversation, `INVALID_INPUT` for empty content, `STORAGE_UNAVAILABLE`
    /// when a turn cannot be written, `UPSTREAM_UNAVAILABLE` when the model fails
    #[instrument(
        name = "send_message",
        skip_all,
        fields(conversation_id = conversation_id, user_id = field::Empty, state = field::Empty)
    )]
    pub async fn send_message(
        &self,
        caller: Option<&User>,
        conversation_id: i64,
        content: &str,
    ) -> AppResult<SendOutcome> {
        let span = Span::current();
        let user = require_authenticated(caller)?;
        span.record("user_id", user.id);
        let conversation = self.owned_conversation(user, conversation_id).await?;

        if content.trim().is_empty() {
            return Err(AppError::invalid_input("Message content must not be empty"));
        }

        self.database
            .create_message(conversation_id, MessageRole::User, content)
            .await?;
        span.record("state", "user_persisted");

        let system_prompt = match conversation.template_id {
            Some(template_id) => self
                .database
                .get_template(template_id)
                .await
                .map(|template| template.content),
            None => None,
        };
        let history = self.database.list_messages(conversation_id).await;
        let request = ChatRequest::new(build_llm_messages(system_prompt.as_deref(), &history));

        span.record("state", "model_invoked");
        let response = match self.llm.complete(&request).await {
            Ok(response) => response,
            Err(e) => {
                span.record("state", "upstream_failed");
                error!(error = %e, provider = self.llm.name(), "Model call failed; user turn kept without reply");
                return Err(e);
            }
        };

        let reply = response.content.unwrap_or_else(|| {
            warn!("Model returned non-text content; storing fallback reply");
            FALLBACK_REPLY.to_owned()
        });
        let stored = self
            .database
            .create_message(conversation_id, MessageRole::Assistant, &reply)
            .await?;
        span.record("state", "assistant_persisted");

        info!(
            user_id = user.id,
            conversation_id,
            model = %response.model,
            "Message exchange completed"
        );
        Ok(SendOutcome {
            content: stored.content,
        })
    }

    async fn owned_conversation(&self, user: &User, conversation_id: i64) -> AppResult<Conversation> {
        let conversation = self.database.get_conversation(conversation_id).await;
        require_conversation_access(user, conversation)
    }
}

/// Prompt sequence for the model: the template's content as the system turn,
/// then stored user and assistant turns in order
///
/// Stored `system` turns are never replayed.
#[must_use]
pub fn build_llm_messages(system_prompt: Option<&str>, history: &[Message]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 1);

    if let Some(prompt) = system_prompt {
        messages.push(ChatMessage::system(prompt));
    }

    messages.extend(history.iter().filter_map(|msg| match msg.role {
        MessageRole::User => Some(ChatMessage::user(&msg.content)),
        MessageRole::Assistant => Some(ChatMessage::assistant(&msg.content)),
        MessageRole::System => None,
    }));

    messages
}
