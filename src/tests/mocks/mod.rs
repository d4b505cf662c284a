//! Scripted completion providers built on the mockall-generated
//! `MockLLMProvider`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::llm::provider::MockLLMProvider;
use crate::core::llm::{ChatResponse, LLMError, TokenUsage};

/// A successful response carrying `content`.
pub fn chat_response(content: &str) -> ChatResponse {
    ChatResponse {
        content: content.to_string(),
        model: "mock-model".to_string(),
        provider: "mock".to_string(),
        usage: Some(TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        }),
        finish_reason: Some("stop".to_string()),
        latency_ms: 5,
    }
}

/// Replies with `replies` in order, then fails with a 500.
pub fn scripted_provider(replies: Vec<String>) -> MockLLMProvider {
    let mut queue: VecDeque<String> = replies.into();
    let mut mock = MockLLMProvider::new();
    mock.expect_chat().returning(move |_| match queue.pop_front() {
        Some(reply) => Ok(chat_response(&reply)),
        None => Err(LLMError::ApiError {
            status: 500,
            message: "no scripted reply left".to_string(),
        }),
    });
    mock
}

/// Replies with `reply` every time and records each prompt it was sent.
pub fn recording_provider(reply: &str, prompts: Arc<Mutex<Vec<String>>>) -> MockLLMProvider {
    let reply = reply.to_string();
    let mut mock = MockLLMProvider::new();
    mock.expect_chat().returning(move |request| {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        prompts.lock().unwrap().push(prompt);
        Ok(chat_response(&reply))
    });
    mock
}

/// A provider that must never be called.
pub fn unreachable_provider() -> MockLLMProvider {
    let mut mock = MockLLMProvider::new();
    mock.expect_chat().never();
    mock
}
