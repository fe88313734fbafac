// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Wires the store, the language model and the services built on top of them once at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::auth::AuthService;
use crate::config::ServerConfig;
use crate::database_plugins::DatabaseProvider;
use crate::llm::LlmProvider;
use crate::services::{ConversationOrchestrator, TemplateService};
use std::sync::Arc;

/// Centralized resource container
///
/// Everything is created once and shared through `Arc`, so handlers never
/// open connections or build HTTP clients per request.
#[derive(Clone)]
pub struct ServerResources {
    /// Storage port
    pub database: Arc<dyn DatabaseProvider>,
    /// Language model port
    pub llm: Arc<dyn LlmProvider>,
    /// Session issue and caller resolution
    pub auth: AuthService,
    /// Template lifecycle
    pub templates: TemplateService,
    /// Conversations and the send pipeline
    pub orchestrator: ConversationOrchestrator,
    /// Loaded configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Build resources from already-opened collaborators
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        database: Arc<dyn DatabaseProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        let auth = AuthService::new(database.clone(), &config.auth);
        let templates = TemplateService::new(database.clone());
        let orchestrator = ConversationOrchestrator::new(
            database.clone(),
            llm.clone(),
            config.conversation_start_policy,
        );

        Self {
            database,
            llm,
            auth,
            templates,
            orchestrator,
            config,
        }
    }
}
