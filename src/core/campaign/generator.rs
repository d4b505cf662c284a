//! Campaign fetchers: one call per model-backed operation.
//!
//! Replies are parsed in two steps. Text that is not JSON at all becomes
//! [`CampaignError::InvalidJson`]; JSON that does not match the expected
//! shape becomes [`CampaignError::InvalidShape`]. Beyond that the reply is
//! trusted, and consistency problems are only logged.

use serde::de::DeserializeOwned;
use tracing::instrument;

use super::error::{CampaignError, CampaignOperation, Result};
use super::prompts;
use super::types::{CampaignInput, CampaignResult, CampaignUpdate, GeneratedCampaign, InsertPosition};
use crate::core::llm::CompletionClient;

pub struct CampaignGenerator {
    client: CompletionClient,
}

impl CampaignGenerator {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, prompt), fields(prompt_chars = prompt.len()))]
    async fn fetch<T: DeserializeOwned>(&self, operation: CampaignOperation, prompt: String) -> Result<T> {
        log::info!("Requesting {operation}");
        let raw = self
            .client
            .complete(&prompt)
            .await
            .map_err(|source| CampaignError::Llm { operation, source })?;
        parse_reply(operation, &raw)
    }

    pub async fn generate(&self, input: &CampaignInput) -> Result<GeneratedCampaign> {
        let generated: GeneratedCampaign = self
            .fetch(CampaignOperation::Generate, prompts::generate_campaign_prompt(input))
            .await?;

        if generated.sessions.len() != input.length as usize {
            log::warn!(
                "Asked for {} sessions, model returned {}",
                input.length,
                generated.sessions.len()
            );
        }
        Ok(generated)
    }

    pub async fn edit_npc(&self, campaign: &CampaignResult, npc_id: &str, instruction: &str) -> Result<CampaignUpdate> {
        self.fetch(
            CampaignOperation::EditNpc,
            prompts::npc_edit_prompt(campaign, npc_id, instruction),
        )
        .await
    }

    pub async fn edit_session(
        &self,
        campaign: &CampaignResult,
        session_id: &str,
        instruction: &str,
    ) -> Result<CampaignUpdate> {
        self.fetch(
            CampaignOperation::EditSession,
            prompts::session_edit_prompt(campaign, session_id, instruction),
        )
        .await
    }

    pub async fn add_session(
        &self,
        campaign: &CampaignResult,
        anchor_session_id: &str,
        instruction: &str,
        position: InsertPosition,
    ) -> Result<CampaignUpdate> {
        self.fetch(
            CampaignOperation::AddSession,
            prompts::add_session_prompt(campaign, anchor_session_id, instruction, position),
        )
        .await
    }

    pub async fn add_npc(&self, campaign: &CampaignResult, instruction: &str) -> Result<CampaignUpdate> {
        self.fetch(CampaignOperation::AddNpc, prompts::add_npc_prompt(campaign, instruction))
            .await
    }
}

/// Parse model output into `T`, separating syntax errors from shape errors.
pub fn parse_reply<T: DeserializeOwned>(operation: CampaignOperation, raw: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|source| CampaignError::InvalidJson { operation, source })?;
    serde_json::from_value(value).map_err(|source| CampaignError::InvalidShape { operation, source })
}

/// Log the consistency rules the model is asked to follow but nothing enforces.
pub fn log_consistency_warnings(campaign: &CampaignResult) {
    for (session_id, npc_id) in campaign.dangling_npc_refs() {
        log::warn!(
            "Campaign {}: session {session_id} references unknown NPC {npc_id}",
            campaign.id
        );
    }
    if !campaign.npcs.is_empty() && !campaign.has_bbeg() {
        log::warn!("Campaign {} has no NPC flagged as BBEG", campaign.id);
    }
    if !campaign.numbering_is_contiguous() {
        log::warn!("Campaign {} has gaps or repeats in session numbers", campaign.id);
    }
}
