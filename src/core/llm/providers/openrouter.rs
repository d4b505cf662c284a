//! OpenRouter Provider Implementation
//!
//! OpenRouter fronts many upstream models through a single OpenAI-style API.

use std::time::Duration;

use async_trait::async_trait;

use super::openai::OpenAICompatibleProvider;
use crate::core::llm::error::Result;
use crate::core::llm::provider::LLMProvider;
use crate::core::llm::types::{ChatRequest, ChatResponse};

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

pub struct OpenRouterProvider {
    inner: OpenAICompatibleProvider,
}

impl OpenRouterProvider {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            inner: OpenAICompatibleProvider::with_timeout(
                "openrouter".to_string(),
                "OpenRouter".to_string(),
                api_key,
                model,
                4096,
                OPENROUTER_BASE_URL.to_string(),
                timeout,
            ),
        }
    }
}

#[async_trait]
impl LLMProvider for OpenRouterProvider {
    fn id(&self) -> &str {
        "openrouter"
    }

    fn name(&self) -> &str {
        "OpenRouter"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.inner.chat(request).await
    }
}
