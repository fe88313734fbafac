// ABOUTME: Main library entry point for the promptdesk template-driven chat service
// ABOUTME: Exposes storage, auth, services and the HTTP surface to the binaries and integration tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Promptdesk Server
//!
//! Administrators curate prompt templates; signed-in users open conversations
//! seeded from a template and chat with a language model that receives the
//! template's content as its system prompt.
//!
//! ## Architecture
//!
//! - **Storage**: `DatabaseProvider` port with a `SQLite` implementation
//! - **Services**: template lifecycle and conversation orchestration
//! - **LLM**: `LlmProvider` port with an OpenAI-compatible client
//! - **Routes**: thin axum handlers over the services
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use promptdesk_server::config::environment::ServerConfig;
//! use promptdesk_server::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Promptdesk configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Session tokens and caller resolution
pub mod auth;

/// Environment configuration
pub mod config;

/// Application constants and defaults
pub mod constants;

/// `SQLite` managers per table
pub mod database;

/// Storage port and its implementations
pub mod database_plugins;

/// Unified error handling
pub mod errors;

/// Language model port and the OpenAI-compatible client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Authorization guards and HTTP layers
pub mod middleware;

/// Domain records
pub mod models;

/// Shared state handed to routes
pub mod resources;

/// HTTP routes
pub mod routes;

/// Cookie helpers
pub mod security;

/// Router assembly and serving
pub mod server;

/// Business logic independent of HTTP
pub mod services;
