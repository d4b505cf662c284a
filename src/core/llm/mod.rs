//! LLM Client Module
//!
//! Unified interface over OpenAI-compatible chat-completion providers.
//!
//! # Module Structure
//!
//! - `types`: chat messages, requests and responses
//! - `provider`: the `LLMProvider` trait
//! - `providers`: concrete providers and the provider metadata table
//! - `completion`: the single-prompt client used by campaign generation

pub mod completion;
pub mod error;
pub mod provider;
pub mod providers;
pub mod types;

pub use completion::{strip_code_fence, CompletionClient};
pub use error::{LLMError, Result};
pub use provider::LLMProvider;
pub use providers::*;
pub use types::{ChatMessage, ChatRequest, ChatResponse, MessageRole, TokenUsage};
