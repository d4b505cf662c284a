use async_trait::async_trait;

use super::error::Result;
use super::types::{ChatRequest, ChatResponse};

/// A chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Stable provider identifier, e.g. "groq".
    fn id(&self) -> &str;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Model the provider sends requests to.
    fn model(&self) -> &str;

    /// Send a chat request and wait for the full response.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
