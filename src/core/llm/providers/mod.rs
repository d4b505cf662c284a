//! LLM Provider Implementations
//!
//! Concrete `LLMProvider` implementations plus the canonical provider
//! metadata table.
//!
//! Adding a new provider requires:
//! 1. A new enum variant in `ProviderConfig`
//! 2. A new entry in `PROVIDERS`
//! 3. The provider implementation file

mod groq;
mod openai;
mod openrouter;

pub use groq::{GroqProvider, GROQ_BASE_URL, GROQ_DEFAULT_MODEL};
pub use openai::{OpenAICompatibleProvider, DEFAULT_TIMEOUT_SECS};
pub use openrouter::OpenRouterProvider;

use std::sync::Arc;
use std::time::Duration;

use super::error::LLMError;
use super::provider::LLMProvider;

// ── Auth method ─────────────────────────────────────────────────────────────

/// How a provider authenticates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AuthMethod {
    /// Bearer API key.
    ApiKey,
    /// Host URL only (Ollama).
    HostOnly,
}

// ── Provider metadata ───────────────────────────────────────────────────────

/// Static metadata for a known provider.
#[derive(Clone, Debug)]
pub struct ProviderMeta {
    pub id: &'static str,
    pub display_name: &'static str,
    pub auth_method: AuthMethod,
    pub default_model: &'static str,
    /// Environment variable consulted when no key is configured.
    pub key_env: &'static str,
    pub key_placeholder: &'static str,
}

impl ProviderMeta {
    pub fn needs_api_key(&self) -> bool {
        self.auth_method == AuthMethod::ApiKey
    }
}

/// Canonical table of all known providers. Single source of truth.
pub const PROVIDERS: &[ProviderMeta] = &[
    ProviderMeta {
        id: "groq",
        display_name: "Groq",
        auth_method: AuthMethod::ApiKey,
        default_model: GROQ_DEFAULT_MODEL,
        key_env: "GROQ_API_KEY",
        key_placeholder: "gsk_...",
    },
    ProviderMeta {
        id: "openai",
        display_name: "OpenAI",
        auth_method: AuthMethod::ApiKey,
        default_model: "gpt-4o",
        key_env: "OPENAI_API_KEY",
        key_placeholder: "sk-...",
    },
    ProviderMeta {
        id: "openrouter",
        display_name: "OpenRouter",
        auth_method: AuthMethod::ApiKey,
        default_model: "meta-llama/llama-3.3-70b-instruct",
        key_env: "OPENROUTER_API_KEY",
        key_placeholder: "sk-or-...",
    },
    ProviderMeta {
        id: "ollama",
        display_name: "Ollama (Local)",
        auth_method: AuthMethod::HostOnly,
        default_model: "llama3.2",
        key_env: "",
        key_placeholder: "",
    },
];

/// Look up a provider's metadata by ID.
pub fn find_provider_meta(id: &str) -> Option<&'static ProviderMeta> {
    PROVIDERS.iter().find(|p| p.id == id)
}

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OLLAMA_DEFAULT_HOST: &str = "http://localhost:11434";

// ── ProviderConfig ──────────────────────────────────────────────────────────

/// Configuration for creating providers
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ProviderConfig {
    Groq {
        api_key: String,
        model: String,
        base_url: Option<String>,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: Option<String>,
    },
    OpenRouter {
        api_key: String,
        model: String,
    },
    Ollama {
        host: String,
        model: String,
    },
}

impl ProviderConfig {
    /// Build a config from loose settings. An empty `model` selects the
    /// provider default. Key-based providers fail without a key.
    pub fn from_parts(
        provider_id: &str,
        model: Option<&str>,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, LLMError> {
        let meta = find_provider_meta(provider_id)
            .ok_or_else(|| LLMError::NotConfigured(format!("unknown provider '{provider_id}'")))?;

        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(meta.default_model)
            .to_string();

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if meta.needs_api_key() && api_key.is_none() {
            return Err(LLMError::NotConfigured(format!(
                "{} needs an API key (set {} or llm.api_key)",
                meta.display_name, meta.key_env
            )));
        }
        let api_key = api_key.unwrap_or_default();

        Ok(match meta.id {
            "groq" => ProviderConfig::Groq {
                api_key,
                model,
                base_url,
            },
            "openai" => ProviderConfig::OpenAI {
                api_key,
                model,
                base_url,
            },
            "openrouter" => ProviderConfig::OpenRouter { api_key, model },
            _ => ProviderConfig::Ollama {
                host: base_url.unwrap_or_else(|| OLLAMA_DEFAULT_HOST.to_string()),
                model,
            },
        })
    }

    /// Create a provider from this configuration
    pub fn create_provider(&self, timeout: Duration) -> Arc<dyn LLMProvider> {
        match self {
            ProviderConfig::Groq {
                api_key,
                model,
                base_url,
            } => Arc::new(GroqProvider::with_base_url(
                api_key.clone(),
                model.clone(),
                base_url.clone().unwrap_or_else(|| GROQ_BASE_URL.to_string()),
                timeout,
            )),
            ProviderConfig::OpenAI {
                api_key,
                model,
                base_url,
            } => Arc::new(OpenAICompatibleProvider::with_timeout(
                "openai".to_string(),
                "OpenAI".to_string(),
                api_key.clone(),
                model.clone(),
                4096,
                base_url.clone().unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
                timeout,
            )),
            ProviderConfig::OpenRouter { api_key, model } => {
                Arc::new(OpenRouterProvider::new(api_key.clone(), model.clone(), timeout))
            }
            ProviderConfig::Ollama { host, model } => {
                Arc::new(OpenAICompatibleProvider::with_timeout(
                    "ollama".to_string(),
                    "Ollama".to_string(),
                    String::new(),
                    model.clone(),
                    4096,
                    format!("{}/v1", host.trim_end_matches('/')),
                    timeout,
                ))
            }
        }
    }

    /// Get the provider ID for this configuration
    pub fn provider_id(&self) -> &'static str {
        match self {
            ProviderConfig::Groq { .. } => "groq",
            ProviderConfig::OpenAI { .. } => "openai",
            ProviderConfig::OpenRouter { .. } => "openrouter",
            ProviderConfig::Ollama { .. } => "ollama",
        }
    }

    /// Get the model name for this configuration
    pub fn model_name(&self) -> &str {
        match self {
            ProviderConfig::Groq { model, .. }
            | ProviderConfig::OpenAI { model, .. }
            | ProviderConfig::OpenRouter { model, .. }
            | ProviderConfig::Ollama { model, .. } => model,
        }
    }

    /// Extract the API key if this variant carries one.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            ProviderConfig::Groq { api_key, .. }
            | ProviderConfig::OpenAI { api_key, .. }
            | ProviderConfig::OpenRouter { api_key, .. } => Some(api_key),
            ProviderConfig::Ollama { .. } => None,
        }
    }
}
