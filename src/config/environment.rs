// ABOUTME: Environment configuration for the promptdesk server
// ABOUTME: Parses ports, database URL, session, LLM and policy settings into a typed ServerConfig
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration

use crate::constants::{defaults, limits::MAX_JWT_EXPIRY_HOURS};
use crate::errors::{AppError, AppResult};
use crate::services::ConversationStartPolicy;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        })
    }
}

/// Session token settings
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for HS256 tokens
    pub jwt_secret: String,
    /// Token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// External identity that is always granted `admin`
    pub owner_open_id: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("owner_open_id", &self.owner_open_id)
            .finish()
    }
}

/// Language model endpoint settings
#[derive(Clone)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Bearer key, if the endpoint needs one
    pub api_key: Option<String>,
    /// Model id sent with every request
    pub model: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Main server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// sqlx SQLite URL
    pub database_url: String,
    /// Session settings
    pub auth: AuthConfig,
    /// Language model settings
    pub llm: LlmConfig,
    /// How `conversations.create` treats an existing conversation
    pub conversation_start_policy: ConversationStartPolicy,
    /// Allowed CORS origins, `*` for any
    pub cors_origins: Vec<String>,
    /// Deployment environment
    pub environment: Environment,
}

impl ServerConfig {
    /// Load configuration from environment variables, reading `.env` first if present
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` when a value fails to parse or a production
    /// deployment lacks `JWT_SECRET`
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let environment =
            Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if environment.is_production() => {
                return Err(AppError::config("JWT_SECRET is required in production"));
            }
            _ => {
                warn!("JWT_SECRET not set, generating a per-process secret; sessions will not survive a restart");
                format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
            }
        };

        let config = Self {
            http_port: parse_env("HTTP_PORT", defaults::HTTP_PORT)?,
            database_url: env_var_or("DATABASE_URL", defaults::DATABASE_URL),
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: parse_env("JWT_EXPIRY_HOURS", defaults::JWT_EXPIRY_HOURS)?,
                owner_open_id: env::var("OWNER_OPEN_ID").ok().filter(|v| !v.is_empty()),
            },
            llm: LlmConfig {
                base_url: env_var_or("LLM_BASE_URL", defaults::LLM_BASE_URL),
                api_key: env::var("LLM_API_KEY").ok().filter(|v| !v.is_empty()),
                model: env_var_or("LLM_MODEL", defaults::LLM_MODEL),
                timeout: Duration::from_secs(parse_env(
                    "LLM_TIMEOUT_SECS",
                    defaults::LLM_TIMEOUT_SECS,
                )?),
            },
            conversation_start_policy: parse_env(
                "CONVERSATION_START_POLICY",
                ConversationStartPolicy::default(),
            )?,
            cors_origins: parse_origins(&env_var_or("CORS_ORIGINS", defaults::CORS_ORIGINS)),
            environment,
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `CONFIG_ERROR` on an out-of-range token lifetime or an empty origin list
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.auth.jwt_expiry_hours) {
            return Err(AppError::config(format!(
                "JWT_EXPIRY_HOURS must be between 1 and {MAX_JWT_EXPIRY_HOURS}"
            )));
        }
        if self.cors_origins.is_empty() {
            return Err(AppError::config("CORS_ORIGINS must list at least one origin"));
        }
        if self.llm.api_key.is_none() {
            warn!("LLM_API_KEY is not set; requests to the model endpoint are unauthenticated");
        }
        Ok(())
    }

    /// Summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Promptdesk Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - LLM Endpoint: {}\n\
             - LLM Model: {}\n\
             - LLM API Key: {}\n\
             - Owner Identity: {}\n\
             - Conversation Start Policy: {}\n\
             - CORS Origins: {}",
            self.http_port,
            self.environment,
            if self.database_url.contains(":memory:") {
                "SQLite (in-memory)"
            } else {
                "SQLite"
            },
            self.llm.base_url,
            self.llm.model,
            if self.llm.api_key.is_some() {
                "Configured"
            } else {
                "Missing"
            },
            if self.auth.owner_open_id.is_some() {
                "Configured"
            } else {
                "Unset"
            },
            self.conversation_start_policy,
            self.cors_origins.join(", ")
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(default),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins: &str) -> Vec<String> {
    if origins.trim() == "*" {
        return vec!["*".to_owned()];
    }
    origins
        .split(',')
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .collect()
}
