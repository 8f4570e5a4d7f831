// src/core/llm.rs
//! Language-model capability - OpenRouter chat completions behind a trait

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::config::LlmConfig;

const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no language-model credential configured")]
    Unconfigured,
    #[error("language-model request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("language-model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language-model response carried no content")]
    EmptyResponse,
}

/// The single operation the scan pipeline needs from a language model.
/// Implementations must tolerate being unconfigured; callers degrade on
/// `LlmError::Unconfigured` instead of failing their scan.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn is_configured(&self) -> bool;

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Cheap reachability probe for the readiness check
    async fn verify(&self) -> bool {
        self.complete(
            "You are a connectivity probe.",
            "Reply with the word OK.",
            false,
            8,
        )
        .await
        .is_ok()
    }
}

// ===== OpenRouter implementation =====

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenRouterClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Point the client at a different endpoint, used by tests
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::Unconfigured)?;
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            max_tokens,
            response_format: json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!(
            model = %self.model,
            prompt_length = user_prompt.len(),
            json_mode,
            "Calling language model"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(response_length = content.len(), "Language model replied");
        Ok(content)
    }
}
