// ABOUTME: Domain records for users, prompt templates, conversations and messages
// ABOUTME: Re-exported from the foundation crate so the server and its tests share one definition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use promptdesk_core::models::{
    Conversation, Message, MessageRole, PromptTemplate, TemplateUpdate, UpsertUser, User,
    UserRole,
};
