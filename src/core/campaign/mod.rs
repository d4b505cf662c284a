//! Campaign Module
//!
//! Data model, prompt construction, model-backed fetchers, the merge
//! engine, text export and the controller that ties them to storage.

pub mod controller;
pub mod error;
pub mod export;
pub mod generator;
pub mod merge;
pub mod prompts;
pub mod types;

pub use controller::{CampaignCommand, CampaignController, CompletedRequest, PendingRequest, RequestOutput};
pub use error::{CampaignError, CampaignOperation};
pub use export::{export_filename, format_campaign_text, write_export};
pub use generator::CampaignGenerator;
pub use merge::merge_campaign_update;
pub use types::{
    CampaignInput, CampaignResult, CampaignUpdate, GeneratedCampaign, InsertPosition, Npc, Session,
    GENRE_OPTIONS,
};
