// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory store, scripted language model and signed-in users for route tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `promptdesk_server`

use async_trait::async_trait;
use promptdesk_server::{
    auth::LoginIdentity,
    config::environment::{AuthConfig, Environment, LlmConfig, ServerConfig},
    database_plugins::{factory::open_database, DatabaseProvider},
    errors::AppError,
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::User,
    resources::ServerResources,
    services::ConversationStartPolicy,
};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// External identity configured as the owner in [`test_config`]
pub const OWNER_OPEN_ID: &str = "owner-open-id";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Configuration for an in-memory server
pub fn test_config(policy: ConversationStartPolicy) -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-with-enough-entropy".to_owned(),
            jwt_expiry_hours: 1,
            owner_open_id: Some(OWNER_OPEN_ID.to_owned()),
        },
        llm: LlmConfig {
            base_url: "http://127.0.0.1:9/v1".to_owned(),
            api_key: None,
            model: "scripted".to_owned(),
            timeout: Duration::from_secs(5),
        },
        conversation_start_policy: policy,
        cors_origins: vec!["*".to_owned()],
        environment: Environment::Testing,
    }
}

/// Behaviour of the next completions served by [`ScriptedLlm`]
#[derive(Debug, Clone)]
pub enum Script {
    /// Answer with `"reply to: <last user message>"`
    Echo,
    /// Answer with a choice whose content is not text
    NonText,
    /// Fail as an unreachable upstream
    Fail,
}

/// Language model double that records every request it receives
pub struct ScriptedLlm {
    script: Mutex<Script>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(Script::Echo),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.script.lock().unwrap().clone();

        let content = match script {
            Script::Fail => {
                return Err(AppError::upstream_unavailable("scripted upstream failure"));
            }
            Script::NonText => None,
            Script::Echo => {
                let last = request
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                Some(format!("reply to: {last}"))
            }
        };

        Ok(ChatResponse {
            content,
            model: "scripted".to_owned(),
            usage: None,
            finish_reason: Some("stop".to_owned()),
        })
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(true)
    }
}

/// In-memory store with the schema applied
pub async fn create_test_database() -> Arc<dyn DatabaseProvider> {
    init_test_logging();
    open_database("sqlite::memory:").await.unwrap()
}

/// Resources over a fresh in-memory store and the given model double
pub async fn create_test_resources(
    llm: Arc<ScriptedLlm>,
    policy: ConversationStartPolicy,
) -> Arc<ServerResources> {
    let database = create_test_database().await;
    Arc::new(ServerResources::new(
        Arc::new(test_config(policy)),
        database,
        llm,
    ))
}

/// Sign in `open_id` through the regular login path and return the user and token
pub async fn sign_in(resources: &ServerResources, open_id: &str) -> (User, String) {
    let outcome = resources
        .auth
        .complete_login(LoginIdentity {
            open_id: open_id.to_owned(),
            name: Some(format!("User {open_id}")),
            email: Some(format!("{open_id}@example.com")),
            login_method: Some("test".to_owned()),
        })
        .await
        .unwrap();
    (outcome.user, outcome.token)
}

/// Sign in the configured owner, who is always an admin
pub async fn sign_in_admin(resources: &ServerResources) -> (User, String) {
    sign_in(resources, OWNER_OPEN_ID).await
}
