// ABOUTME: OpenAI-compatible chat completions client used as the default LLM collaborator
// ABOUTME: Works against OpenAI itself or any server exposing /chat/completions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Sends the assembled prompt to `{base_url}/chat/completions` and returns
//! the first choice. Connection and whole-request timeouts are owned here.
//!
//! ```rust,no_run
//! use promptdesk_server::llm::{ChatMessage, ChatRequest, LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
//!
//! # async fn example() -> Result<(), promptdesk_server::errors::AppError> {
//! let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::default())?;
//! let response = provider
//!     .complete(&ChatRequest::new(vec![ChatMessage::user("Hello")]))
//!     .await?;
//! println!("{:?}", response.content);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider, TokenUsage};
use crate::config::LlmConfig;
use crate::constants::defaults;
use crate::errors::AppError;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Connection establishment timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Longest error body echoed into logs
const MAX_LOGGED_BODY: usize = 500;

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for OpenAiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

/// `content` may be a string, null, or a structured array depending on the backend
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl Default for OpenAiCompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::LLM_BASE_URL.to_owned(),
            api_key: None,
            default_model: defaults::LLM_MODEL.to_owned(),
            request_timeout: Duration::from_secs(defaults::LLM_TIMEOUT_SECS),
        }
    }
}

impl From<&LlmConfig> for OpenAiCompatibleConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.model.clone(),
            request_timeout: config.timeout,
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized OpenAI-compatible provider"
        );
        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    fn add_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// Map a non-success HTTP status and body to an upstream error
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(MAX_LOGGED_BODY).collect::<String>(),
            |parsed| parsed.error.message,
        );
        let message = match status.as_u16() {
            401 | 403 => format!("Model endpoint rejected credentials: {detail}"),
            404 => format!("Model or endpoint not found: {detail}"),
            429 => format!("Model endpoint rate limited the request: {detail}"),
            code => format!("Model endpoint returned HTTP {code}: {detail}"),
        };
        AppError::upstream_unavailable(message)
    }

    /// Decode a successful completion body into its first choice
    fn parse_completion(body: &str, requested_model: &str) -> Result<ChatResponse, AppError> {
        let response: OpenAiResponse = serde_json::from_str(body).map_err(|e| {
            error!(
                "Failed to parse completion response: {e} - body: {}",
                body.chars().take(MAX_LOGGED_BODY).collect::<String>()
            );
            AppError::upstream_unavailable(format!("Malformed completion response: {e}"))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream_unavailable("Completion returned no choices"))?;

        let content = match choice.message.content {
            Some(Value::String(text)) => Some(text),
            _ => None,
        };

        Ok(ChatResponse {
            content,
            model: response
                .model
                .unwrap_or_else(|| requested_model.to_owned()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model), messages = request.messages.len()))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let payload = OpenAiRequest {
            model,
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            stream: false,
        };

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&payload);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to reach model endpoint: {e}");
                if e.is_timeout() {
                    AppError::upstream_unavailable("Model endpoint timed out")
                } else if e.is_connect() {
                    AppError::upstream_unavailable(format!(
                        "Cannot connect to model endpoint at {}",
                        self.config.base_url
                    ))
                } else {
                    AppError::upstream_unavailable(format!("Model request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read completion response: {e}");
            AppError::upstream_unavailable(format!("Failed to read completion response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let parsed = Self::parse_completion(&body, model)?;
        debug!(
            content_chars = parsed.content.as_ref().map_or(0, String::len),
            finish_reason = ?parsed.finish_reason,
            "Received completion"
        );
        Ok(parsed)
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        let response = self
            .add_auth_header(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| AppError::upstream_unavailable(format!("Health check failed: {e}")))?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let body = r#"{
            "model": "gpt-4o-mini",
            "choices": [
                {"message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }"#;
        let response = OpenAiCompatibleProvider::parse_completion(body, "fallback").unwrap();

        assert_eq!(response.content.as_deref(), Some("first"));
        assert_eq!(response.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn test_non_text_content_is_none() {
        let body = r#"{"choices": [{"message": {"content": null}, "finish_reason": "stop"}]}"#;
        let response = OpenAiCompatibleProvider::parse_completion(body, "m").unwrap();
        assert!(response.content.is_none());
        assert_eq!(response.model, "m");

        let body = r#"{"choices": [{"message": {"content": [{"type": "image"}]}}]}"#;
        let response = OpenAiCompatibleProvider::parse_completion(body, "m").unwrap();
        assert!(response.content.is_none());
    }

    #[test]
    fn test_empty_choices_is_upstream_failure() {
        let err = OpenAiCompatibleProvider::parse_completion(r#"{"choices": []}"#, "m").unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
    }

    #[test]
    fn test_error_response_mapping() {
        let err = OpenAiCompatibleProvider::parse_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "bad key"}}"#,
        );
        assert_eq!(err.code, ErrorCode::UpstreamUnavailable);
        assert!(err.message.contains("bad key"));

        let err = OpenAiCompatibleProvider::parse_error_response(
            StatusCode::BAD_GATEWAY,
            "<html>oops</html>",
        );
        assert!(err.message.contains("502"));
    }

    #[test]
    fn test_api_url_trims_slash() {
        let provider = OpenAiCompatibleProvider::new(OpenAiCompatibleConfig {
            base_url: "http://localhost:11434/v1/".to_owned(),
            ..OpenAiCompatibleConfig::default()
        })
        .unwrap();
        assert_eq!(
            provider.api_url("chat/completions"),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
