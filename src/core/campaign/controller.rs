//! Campaign state and the commands that change it.
//!
//! [`CampaignController`] is the single owner of campaign state. Model-backed
//! operations run in three steps so the network call never holds the
//! controller: [`CampaignController::prepare`] validates and snapshots,
//! [`PendingRequest::run`] talks to the model, and
//! [`CampaignController::apply`] merges and persists. A failed request
//! leaves both memory and storage untouched.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::{CampaignError, CampaignOperation, Result};
use super::export::write_export;
use super::generator::{log_consistency_warnings, CampaignGenerator};
use super::merge::merge_campaign_update;
use super::types::{CampaignInput, CampaignResult, CampaignUpdate, GeneratedCampaign, InsertPosition};
use crate::core::storage::CampaignStore;

/// A model-backed change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignCommand {
    Generate(CampaignInput),
    EditNpc {
        npc_id: String,
        instruction: String,
    },
    EditSession {
        session_id: String,
        instruction: String,
    },
    AddSession {
        anchor_session_id: String,
        instruction: String,
        position: InsertPosition,
    },
    AddNpc {
        instruction: String,
    },
}

impl CampaignCommand {
    pub fn operation(&self) -> CampaignOperation {
        match self {
            CampaignCommand::Generate(_) => CampaignOperation::Generate,
            CampaignCommand::EditNpc { .. } => CampaignOperation::EditNpc,
            CampaignCommand::EditSession { .. } => CampaignOperation::EditSession,
            CampaignCommand::AddSession { .. } => CampaignOperation::AddSession,
            CampaignCommand::AddNpc { .. } => CampaignOperation::AddNpc,
        }
    }

    fn instruction(&self) -> Option<&str> {
        match self {
            CampaignCommand::Generate(_) => None,
            CampaignCommand::EditNpc { instruction, .. }
            | CampaignCommand::EditSession { instruction, .. }
            | CampaignCommand::AddSession { instruction, .. }
            | CampaignCommand::AddNpc { instruction } => Some(instruction),
        }
    }
}

/// What a finished request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutput {
    Generated(GeneratedCampaign),
    Update(CampaignUpdate),
}

/// A validated command with everything it needs to run off the controller.
pub struct PendingRequest {
    command: CampaignCommand,
    snapshot: Option<CampaignResult>,
    generator: Arc<CampaignGenerator>,
}

impl PendingRequest {
    pub fn operation(&self) -> CampaignOperation {
        self.command.operation()
    }

    /// Perform the model call.
    pub async fn run(self) -> CompletedRequest {
        let operation = self.command.operation();
        let result = match (&self.command, &self.snapshot) {
            (CampaignCommand::Generate(input), _) => {
                self.generator.generate(input).await.map(RequestOutput::Generated)
            }
            (CampaignCommand::EditNpc { npc_id, instruction }, Some(c)) => self
                .generator
                .edit_npc(c, npc_id, instruction)
                .await
                .map(RequestOutput::Update),
            (CampaignCommand::EditSession { session_id, instruction }, Some(c)) => self
                .generator
                .edit_session(c, session_id, instruction)
                .await
                .map(RequestOutput::Update),
            (
                CampaignCommand::AddSession {
                    anchor_session_id,
                    instruction,
                    position,
                },
                Some(c),
            ) => self
                .generator
                .add_session(c, anchor_session_id, instruction, *position)
                .await
                .map(RequestOutput::Update),
            (CampaignCommand::AddNpc { instruction }, Some(c)) => self
                .generator
                .add_npc(c, instruction)
                .await
                .map(RequestOutput::Update),
            (_, None) => Err(CampaignError::NoActiveCampaign),
        };

        CompletedRequest {
            operation,
            snapshot: self.snapshot,
            result,
        }
    }
}

/// The outcome of [`PendingRequest::run`], ready for [`CampaignController::apply`].
#[derive(Debug)]
pub struct CompletedRequest {
    pub operation: CampaignOperation,
    snapshot: Option<CampaignResult>,
    pub result: Result<RequestOutput>,
}

pub struct CampaignController {
    store: CampaignStore,
    generator: Arc<CampaignGenerator>,
    campaigns: Vec<CampaignResult>,
    selected_id: Option<String>,
    busy: Option<CampaignOperation>,
    error: Option<String>,
    last_input: Option<CampaignInput>,
}

impl CampaignController {
    pub fn new(store: CampaignStore, generator: Arc<CampaignGenerator>) -> Self {
        Self {
            store,
            generator,
            campaigns: Vec::new(),
            selected_id: None,
            busy: None,
            error: None,
            last_input: None,
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn campaigns(&self) -> &[CampaignResult] {
        &self.campaigns
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn active(&self) -> Option<&CampaignResult> {
        let id = self.selected_id.as_deref()?;
        self.campaigns.iter().find(|c| c.id == id)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_some()
    }

    pub fn busy_operation(&self) -> Option<CampaignOperation> {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn last_input(&self) -> Option<&CampaignInput> {
        self.last_input.as_ref()
    }

    // ── Loading ─────────────────────────────────────────────────────────────

    /// Restore saved campaigns, the last selection and the last form input.
    /// Entries that are missing or unreadable are dropped from the index.
    pub fn load(&mut self) -> Result<()> {
        let index = self.store.load_index()?;
        let mut campaigns = Vec::with_capacity(index.len());

        for id in &index {
            match self.store.load_campaign(id) {
                Ok(Some(campaign)) => campaigns.push(campaign),
                Ok(None) => log::warn!("Campaign {id} is indexed but missing from storage"),
                Err(e) => log::warn!("Skipping unreadable campaign {id}: {e}"),
            }
        }

        if campaigns.len() != index.len() {
            let ids: Vec<String> = campaigns.iter().map(|c| c.id.clone()).collect();
            self.store.save_index(&ids)?;
        }

        let selected = self
            .store
            .load_selected()?
            .filter(|id| campaigns.iter().any(|c| &c.id == id));

        self.last_input = match self.store.load_last_input() {
            Ok(input) => input,
            Err(e) => {
                log::warn!("Ignoring unreadable last input: {e}");
                None
            }
        };

        log::info!("Loaded {} campaign(s)", campaigns.len());
        self.campaigns = campaigns;
        self.selected_id = selected;
        Ok(())
    }

    // ── Direct edits ────────────────────────────────────────────────────────

    pub fn select(&mut self, id: &str) -> Result<()> {
        if !self.campaigns.iter().any(|c| c.id == id) {
            return Err(CampaignError::NotFound(format!("campaign {id}")));
        }
        self.store.save_selected(id)?;
        self.selected_id = Some(id.to_string());
        log::debug!("Selected campaign {id}");
        Ok(())
    }

    /// Remove the active campaign from storage and the index, then clear the selection.
    pub fn delete_selected(&mut self) -> Result<CampaignResult> {
        let id = self
            .selected_id
            .clone()
            .ok_or(CampaignError::NoActiveCampaign)?;
        let position = self
            .campaigns
            .iter()
            .position(|c| c.id == id)
            .ok_or(CampaignError::NoActiveCampaign)?;

        let ids: Vec<String> = self
            .campaigns
            .iter()
            .filter(|c| c.id != id)
            .map(|c| c.id.clone())
            .collect();
        self.store.delete_campaign(&id)?;
        self.store.save_index(&ids)?;
        self.store.clear_selected()?;

        self.selected_id = None;
        log::info!("Deleted campaign {id}");
        Ok(self.campaigns.remove(position))
    }

    /// Replace the active campaign's title and summary.
    pub fn update_title_summary(&mut self, title: &str, summary: &str) -> Result<()> {
        let title = title.trim();
        if title.is_empty() {
            return Err(CampaignError::Validation("Title cannot be empty".to_string()));
        }
        let mut campaign = self.active().cloned().ok_or(CampaignError::NoActiveCampaign)?;
        campaign.title = title.to_string();
        campaign.summary = summary.trim().to_string();
        self.commit(campaign)
    }

    /// Write the active campaign as text into `dir`.
    pub fn export_selected(&self, dir: &Path, filename: &str) -> Result<PathBuf> {
        let campaign = self.active().ok_or(CampaignError::NoActiveCampaign)?;
        write_export(dir, filename, campaign)
    }

    // ── Model-backed commands ───────────────────────────────────────────────

    /// Validate `command`, snapshot the active campaign and mark the controller busy.
    pub fn prepare(&mut self, command: CampaignCommand) -> Result<PendingRequest> {
        match self.validate(command) {
            Ok(pending) => {
                self.busy = Some(pending.operation());
                self.error = None;
                Ok(pending)
            }
            Err(e) => {
                if !matches!(e, CampaignError::Busy) {
                    self.error = Some(e.user_message());
                }
                Err(e)
            }
        }
    }

    fn validate(&mut self, command: CampaignCommand) -> Result<PendingRequest> {
        if self.busy.is_some() {
            return Err(CampaignError::Busy);
        }

        if let Some(instruction) = command.instruction() {
            if instruction.trim().is_empty() {
                return Err(CampaignError::Validation("Instruction cannot be empty".to_string()));
            }
        }

        let (command, snapshot) = match command {
            CampaignCommand::Generate(input) => {
                let errors = input.validate();
                if !errors.is_empty() {
                    return Err(CampaignError::Validation(errors.messages().join("; ")));
                }
                let input = input.normalized();
                if let Err(e) = self.store.save_last_input(&input) {
                    log::warn!("Could not remember campaign input: {e}");
                }
                self.last_input = Some(input.clone());
                (CampaignCommand::Generate(input), None)
            }
            other => {
                let campaign = self.active().ok_or(CampaignError::NoActiveCampaign)?;
                match &other {
                    CampaignCommand::EditNpc { npc_id, .. } if campaign.npc(npc_id).is_none() => {
                        return Err(CampaignError::NotFound(format!("NPC {npc_id}")));
                    }
                    CampaignCommand::EditSession { session_id, .. }
                        if campaign.session(session_id).is_none() =>
                    {
                        return Err(CampaignError::NotFound(format!("session {session_id}")));
                    }
                    CampaignCommand::AddSession {
                        anchor_session_id, ..
                    } if !campaign.sessions.is_empty()
                        && campaign.session(anchor_session_id).is_none() =>
                    {
                        return Err(CampaignError::NotFound(format!(
                            "session {anchor_session_id}"
                        )));
                    }
                    _ => {}
                }
                let snapshot = campaign.clone();
                (other, Some(snapshot))
            }
        };

        Ok(PendingRequest {
            command,
            snapshot,
            generator: Arc::clone(&self.generator),
        })
    }

    /// Fold a finished request into state. Returns the id of the campaign it changed.
    pub fn apply(&mut self, completed: CompletedRequest) -> Result<String> {
        self.busy = None;

        let outcome = match completed.result {
            Ok(output) => self.apply_output(output, completed.snapshot),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(id) => {
                self.error = None;
                Ok(id)
            }
            Err(e) => {
                log::warn!("{} failed: {e}", completed.operation);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    fn apply_output(&mut self, output: RequestOutput, snapshot: Option<CampaignResult>) -> Result<String> {
        match output {
            RequestOutput::Generated(generated) => {
                let campaign = generated.into_campaign(uuid::Uuid::new_v4().to_string());
                log_consistency_warnings(&campaign);

                let mut ids: Vec<String> = self.campaigns.iter().map(|c| c.id.clone()).collect();
                ids.push(campaign.id.clone());
                self.store.save_campaign(&campaign)?;
                if let Err(e) = self.store.save_index(&ids) {
                    if let Err(cleanup) = self.store.delete_campaign(&campaign.id) {
                        log::warn!("Could not remove unindexed campaign {}: {cleanup}", campaign.id);
                    }
                    return Err(e.into());
                }
                self.store.save_selected(&campaign.id)?;

                let id = campaign.id.clone();
                log::info!("Created campaign {id} \"{}\"", campaign.title);
                self.campaigns.push(campaign);
                self.selected_id = Some(id.clone());
                Ok(id)
            }
            RequestOutput::Update(update) => {
                let base = snapshot.ok_or(CampaignError::NoActiveCampaign)?;
                let merged = merge_campaign_update(&base, &update);
                log_consistency_warnings(&merged);
                let id = merged.id.clone();
                self.commit(merged)?;
                Ok(id)
            }
        }
    }

    /// Persist `campaign` and replace the in-memory copy with the same id.
    fn commit(&mut self, campaign: CampaignResult) -> Result<()> {
        let slot = self
            .campaigns
            .iter()
            .position(|c| c.id == campaign.id)
            .ok_or_else(|| CampaignError::NotFound(format!("campaign {}", campaign.id)))?;
        self.store.save_campaign(&campaign)?;
        self.campaigns[slot] = campaign;
        Ok(())
    }

    /// Prepare, run and apply in one call.
    pub async fn execute(&mut self, command: CampaignCommand) -> Result<String> {
        let pending = self.prepare(command)?;
        let completed = pending.run().await;
        self.apply(completed)
    }
}
