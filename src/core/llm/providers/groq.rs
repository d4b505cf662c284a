//! Groq Provider Implementation
//!
//! Groq hosts open-weight models behind an OpenAI-compatible API. It is the
//! default backend for campaign generation.

use std::time::Duration;

use async_trait::async_trait;

use super::openai::OpenAICompatibleProvider;
use crate::core::llm::error::Result;
use crate::core::llm::provider::LLMProvider;
use crate::core::llm::types::{ChatRequest, ChatResponse};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Groq provider
pub struct GroqProvider {
    inner: OpenAICompatibleProvider,
}

impl GroqProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::with_base_url(api_key, model, GROQ_BASE_URL.to_string(), timeout)
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String, timeout: Duration) -> Self {
        Self {
            inner: OpenAICompatibleProvider::with_timeout(
                "groq".to_string(),
                "Groq".to_string(),
                api_key,
                model,
                8192,
                base_url,
                timeout,
            ),
        }
    }
}

#[async_trait]
impl LLMProvider for GroqProvider {
    fn id(&self) -> &str {
        "groq"
    }

    fn name(&self) -> &str {
        "Groq"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.inner.chat(request).await
    }
}
