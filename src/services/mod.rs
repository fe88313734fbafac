// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Template lifecycle and conversation orchestration, independent of HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Conversations, messages and the send pipeline
pub mod chat_orchestration;

/// Prompt template lifecycle
pub mod templates;

pub use chat_orchestration::{
    ConversationOrchestrator, ConversationStartPolicy, NewConversation, SendOutcome,
};
pub use templates::{CreateTemplate, TemplateService};
