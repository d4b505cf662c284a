use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::llm::{find_provider_meta, LLMError, ProviderConfig, DEFAULT_TIMEOUT_SECS};

const APP_DIR: &str = "campaign-forge";
const ENV_PREFIX: &str = "CAMPAIGN_FORGE_";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tui: TuiConfig,
    pub data: DataConfig,
    pub llm: LlmConfig,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// Enable mouse support in the terminal.
    pub mouse_enabled: bool,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
    /// Where text exports are written. Defaults to `<data_dir>/exports`.
    pub export_dir: Option<PathBuf>,
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider id from the provider table ("groq", "openai", "openrouter", "ollama").
    pub provider: String,
    /// Model name. Empty selects the provider default.
    pub model: String,
    /// Endpoint override (Ollama host, self-hosted gateways).
    pub base_url: Option<String>,
    /// API key. When unset the provider's environment variable is read.
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            mouse_enabled: false,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: String::new(),
            base_url: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Resolve into a provider config, reading the key from the environment when needed.
    pub fn provider_config(&self) -> Result<ProviderConfig, LLMError> {
        let env_key = find_provider_meta(&self.provider)
            .filter(|meta| !meta.key_env.is_empty())
            .and_then(|meta| std::env::var(meta.key_env).ok());
        let api_key = self.api_key.clone().or(env_key);

        ProviderConfig::from_parts(
            &self.provider,
            Some(self.model.as_str()),
            api_key,
            self.base_url.clone(),
        )
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/campaign-forge/config.toml`.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, overlaid with `CAMPAIGN_FORGE_*`
    /// environment variables (`CAMPAIGN_FORGE_LLM__MODEL` and so on).
    /// Returns `Default` if the result cannot be extracted.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            log::info!("Loading config from {}", path.display());
        } else {
            log::debug!("No config file at {}, using defaults", path.display());
        }

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to read config at {}: {e}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    /// Directory holding the campaign key/value files.
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir().join("store")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data
            .export_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("exports"))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.tui.tick_rate_ms, 50);
        assert!(!config.tui.mouse_enabled);
        assert!(config.data.data_dir.is_none());
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.timeout_secs, 300);
    }

    #[test]
    fn test_config_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(config.tui.tick_rate_ms, 50);
    }

    #[test]
    fn test_config_load_partial_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\nmodel = \"mistral\"\n\n[tui]\ntick_rate_ms = 100\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.model, "mistral");
        assert_eq!(config.tui.tick_rate_ms, 100);
        assert_eq!(config.llm.timeout_secs, 300);
    }

    #[test]
    fn test_config_load_bad_file_falls_back() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tui]\ntick_rate_ms = \"fast\"\n").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.tui.tick_rate_ms, 50);
    }

    #[test]
    fn test_directories_follow_data_dir() {
        let mut config = AppConfig::default();
        config.data.data_dir = Some(PathBuf::from("/tmp/custom"));
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/custom"));
        assert_eq!(config.store_dir(), PathBuf::from("/tmp/custom/store"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/custom/exports"));

        config.data.export_dir = Some(PathBuf::from("/tmp/out"));
        assert_eq!(config.export_dir(), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_explicit_key_wins() {
        let llm = LlmConfig {
            api_key: Some("gsk_explicit".into()),
            ..LlmConfig::default()
        };
        let provider = llm.provider_config().unwrap();
        assert_eq!(provider.api_key(), Some("gsk_explicit"));
        assert_eq!(provider.model_name(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.tui.tick_rate_ms, config.tui.tick_rate_ms);
        assert_eq!(deserialized.llm.provider, config.llm.provider);
    }
}
