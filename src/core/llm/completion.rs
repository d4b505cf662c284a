//! Single-shot completion client used by the campaign fetchers.

use std::sync::Arc;

use super::error::Result;
use super::provider::LLMProvider;
use super::types::ChatRequest;

/// Sends one user-role prompt and returns the unfenced reply text.
#[derive(Clone)]
pub struct CompletionClient {
    provider: Arc<dyn LLMProvider>,
    max_tokens: Option<u32>,
}

impl CompletionClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            max_tokens: None,
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Complete `prompt` and strip any Markdown code fence around the reply.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let mut request = ChatRequest::single_user(prompt);
        if let Some(max) = self.max_tokens {
            request = request.with_max_tokens(max);
        }

        let response = self.provider.chat(request).await?;
        log::debug!(
            "Completion from {}/{} in {}ms ({} chars)",
            response.provider,
            response.model,
            response.latency_ms,
            response.content.len()
        );

        Ok(strip_code_fence(&response.content).to_string())
    }
}

/// Remove a leading "```" or "```json" fence and a trailing "```", then trim.
/// Text without a leading fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    if !text.starts_with("```") {
        return text;
    }

    let body = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    let body = body.strip_suffix("```").unwrap_or(body);
    body.trim()
}
