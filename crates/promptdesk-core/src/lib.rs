// ABOUTME: Foundation crate for the promptdesk template-driven chat service
// ABOUTME: Hosts the error taxonomy and record types shared by the server and CLI
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # promptdesk-core
//!
//! Types that every other part of promptdesk depends on. Nothing here talks
//! to the network or the database.

/// Error codes, `AppError`, and the JSON error body
pub mod errors;

/// Users, prompt templates, conversations and messages
pub mod models;

pub use errors::{AppError, AppResult, ErrorCode, ErrorResponse};
pub use models::{
    Conversation, Message, MessageRole, PromptTemplate, TemplateUpdate, UpsertUser, User,
    UserRole,
};
