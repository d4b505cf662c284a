//! OpenAI-compatible Provider Implementation
//!
//! Groq, OpenRouter, OpenAI itself and Ollama's `/v1` surface all speak the
//! same `/chat/completions` dialect, so they share this client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::core::llm::error::{LLMError, Result};
use crate::core::llm::provider::LLMProvider;
use crate::core::llm::types::{ChatRequest, ChatResponse, TokenUsage};

pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Client for any endpoint implementing the OpenAI chat-completions API.
pub struct OpenAICompatibleProvider {
    id: String,
    name: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new(
        id: String,
        name: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: String,
    ) -> Self {
        Self::with_timeout(
            id,
            name,
            api_key,
            model,
            max_tokens,
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        id: String,
        name: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        base_url: String,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {e}");
                Client::new()
            });

        Self {
            id,
            name,
            api_key,
            model,
            max_tokens,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body(&self, request: &ChatRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens.unwrap_or(self.max_tokens),
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        body
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(&request);

        let start = Instant::now();
        let mut req_builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if !self.api_key.is_empty() {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        log::debug!("POST {} (model {})", url, self.model);
        let resp = req_builder.json(&body).send().await?;
        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(LLMError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LLMError::AuthError(format!(
                "{} rejected the API key",
                self.name
            )));
        }

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: serde_json::Value = resp.json().await?;
        let first_choice = json["choices"].as_array().and_then(|arr| arr.first());

        let content = first_choice
            .and_then(|c| c["message"]["content"].as_str())
            .ok_or_else(|| LLMError::InvalidResponse("Missing content".to_string()))?
            .to_string();

        let finish_reason = first_choice
            .and_then(|c| c["finish_reason"].as_str())
            .map(|s| s.to_string());

        let usage = json["usage"].as_object().map(|u| TokenUsage {
            input_tokens: u
                .get("prompt_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            output_tokens: u
                .get("completion_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        });

        Ok(ChatResponse {
            content,
            model: json["model"].as_str().unwrap_or(&self.model).to_string(),
            provider: self.id.clone(),
            usage,
            finish_reason,
            latency_ms: latency,
        })
    }
}
