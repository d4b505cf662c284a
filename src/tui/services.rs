use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::campaign::{CampaignController, CampaignGenerator, PendingRequest};
use crate::core::llm::CompletionClient;
use crate::core::storage::{CampaignStore, FileKvStore};

use super::events::AppEvent;

/// Centralized handle to the backend.
///
/// Created once at startup and owned by `AppState`. Views read campaign state
/// through `controller` and never mutate it directly.
pub struct Services {
    pub controller: CampaignController,
    pub export_dir: PathBuf,
    /// "provider/model", shown in the status bar.
    pub provider_label: String,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    /// Open the store, build the completion client and load saved campaigns.
    ///
    /// Failures here are fatal. The TUI cannot run without storage or a provider.
    pub fn init(config: &AppConfig, event_tx: mpsc::UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        let store_dir = config.store_dir();
        log::info!("Initializing services with store dir: {}", store_dir.display());

        let kv = FileKvStore::open(&store_dir)
            .with_context(|| format!("opening campaign store at {}", store_dir.display()))?;
        let store = CampaignStore::new(kv);

        let provider_config = config
            .llm
            .provider_config()
            .context("configuring the completion provider")?;
        let provider_label = format!(
            "{}/{}",
            provider_config.provider_id(),
            provider_config.model_name()
        );
        let provider = provider_config.create_provider(config.llm.timeout());
        log::info!("Completion provider ready: {provider_label}");

        let mut client = CompletionClient::new(provider);
        if let Some(max_tokens) = config.llm.max_tokens {
            client = client.with_max_tokens(max_tokens);
        }
        let generator = Arc::new(CampaignGenerator::new(client));

        let mut controller = CampaignController::new(store, generator);
        controller.load().context("loading saved campaigns")?;

        Ok(Self::new(controller, config.export_dir(), provider_label, event_tx))
    }

    pub fn new(
        controller: CampaignController,
        export_dir: PathBuf,
        provider_label: String,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            controller,
            export_dir,
            provider_label,
            event_tx,
        }
    }

    /// Run a prepared request in the background and post the result back to the loop.
    pub fn spawn_request(&self, pending: PendingRequest) {
        let tx = self.event_tx.clone();
        let operation = pending.operation();
        log::debug!("Dispatching {operation}");
        tokio::spawn(async move {
            let completed = pending.run().await;
            if tx.send(AppEvent::RequestFinished(completed)).is_err() {
                log::warn!("Event loop closed before {operation} finished");
            }
        });
    }
}
