//! OpenRouterApiAgent - Direct REST API implementation for OpenRouter.
//!
//! This agent calls the OpenRouter Chat Completions API directly.
//! The API key is supplied by the caller (flag or environment variable)
//! and is never persisted.

use crate::prompts::system_prompt;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use webllama_core::config::AppConfig;
use webllama_core::{GenerationAgent, GenerationRequest, Result, WebllamaError};

/// Environment variable consulted when no key is given on the command line.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Literal prefix every OpenRouter key starts with.
pub const API_KEY_PREFIX: &str = "sk-or-v1-";

/// Client-title header value identifying this tool upstream.
const CLIENT_TITLE: &str = "WebLlama";

/// Sampling temperature for every request.
const TEMPERATURE: f32 = 0.5;

/// Validates the credential's shape before any network call.
///
/// Only the literal required prefix is checked; the key itself is opaque.
pub fn validate_api_key(api_key: &str) -> Result<()> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(WebllamaError::validation(
            "Please enter your OpenRouter API key to continue",
        ));
    }
    if !api_key.starts_with(API_KEY_PREFIX) {
        return Err(WebllamaError::validation(format!(
            "Please enter a valid OpenRouter API key starting with \"{API_KEY_PREFIX}\""
        )));
    }
    Ok(())
}

/// Agent implementation that talks to the OpenRouter HTTP API.
#[derive(Clone)]
pub struct OpenRouterApiAgent {
    client: Client,
    api_key: String,
    api_url: String,
    referer: String,
}

impl OpenRouterApiAgent {
    /// Creates a new agent with the provided API key and configuration.
    pub fn new(api_key: impl Into<String>, config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            api_url: config.api_url.clone(),
            referer: config.referer.clone(),
        }
    }

    /// Loads the API key from the `OPENROUTER_API_KEY` environment variable.
    pub fn try_from_env(config: &AppConfig) -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            WebllamaError::validation(format!(
                "{API_KEY_ENV} not set; pass --api-key or export the variable"
            ))
        })?;
        Ok(Self::new(api_key, config))
    }

    async fn send_request(&self, body: &ChatCompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", CLIENT_TITLE)
            .json(body)
            .send()
            .await
            .map_err(|err| WebllamaError::transport(format!("OpenRouter request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenRouter error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            WebllamaError::internal(format!("Failed to parse OpenRouter response: {err}"))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl GenerationAgent for OpenRouterApiAgent {
    async fn complete(
        &self,
        request: &GenerationRequest,
        cancel: CancellationToken,
    ) -> Result<String> {
        let body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(request.variant).to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            temperature: TEMPERATURE,
        };

        tracing::debug!(model = %request.model, variant = ?request.variant, "sending chat completion request");

        // Biased select: a token cancelled before or during the call wins
        // deterministically; dropping the request future aborts the
        // connection, so a cancelled call never yields a partial result.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WebllamaError::Cancelled),
            result = self.send_request(&body) => result,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[allow(dead_code)]
    code: Option<i64>,
}

fn extract_text_response(response: ChatCompletionResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            WebllamaError::internal("OpenRouter returned no content in the response")
        })
}

fn map_http_error(status: StatusCode, body: String) -> WebllamaError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.clone());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WebllamaError::auth(format!(
            "Invalid API key ({message}). Please check your OpenRouter API key."
        )),
        _ => WebllamaError::http(status.as_u16(), message),
    }
}
