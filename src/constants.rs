// ABOUTME: Application-wide constants for service identity, defaults and limits
// ABOUTME: Centralizes values shared between configuration, routes and the orchestrator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants grouped by concern

/// Service identity
pub mod service {
    /// Human-facing service name
    pub const NAME: &str = "promptdesk";
    /// Tracing target of this crate
    pub const CRATE_TARGET: &str = "promptdesk_server";
}

/// Defaults applied when an environment variable is unset
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// Database location
    pub const DATABASE_URL: &str = "sqlite:./data/promptdesk.db";
    /// Session token lifetime
    pub const JWT_EXPIRY_HOURS: i64 = 168;
    /// OpenAI-compatible endpoint
    pub const LLM_BASE_URL: &str = "https://api.openai.com/v1";
    /// Model id
    pub const LLM_MODEL: &str = "gpt-4o-mini";
    /// Whole-request timeout for the language model
    pub const LLM_TIMEOUT_SECS: u64 = 120;
    /// Allowed CORS origins
    pub const CORS_ORIGINS: &str = "*";
}

/// Validation limits
pub mod limits {
    /// Maximum template and conversation title length, in characters
    pub const MAX_TITLE_CHARS: usize = 255;
    /// Longest accepted session lifetime (ten years), in hours
    pub const MAX_JWT_EXPIRY_HOURS: i64 = 87_600;
}

/// Chat behavior
pub mod chat {
    /// Reply stored when the model returns a choice without text
    pub const FALLBACK_REPLY: &str = "Sorry, I am unable to answer that.";
}

/// Session cookie
pub mod session {
    /// Cookie carrying the session token
    pub const COOKIE_NAME: &str = "auth_token";
}
