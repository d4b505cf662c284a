use miette::Diagnostic;
use thiserror::Error;

use crate::core::llm::LLMError;
use crate::core::storage::StorageError;

/// The model-backed operations a campaign supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignOperation {
    Generate,
    EditNpc,
    EditSession,
    AddSession,
    AddNpc,
}

impl CampaignOperation {
    pub fn label(&self) -> &'static str {
        match self {
            CampaignOperation::Generate => "campaign generation",
            CampaignOperation::EditNpc => "NPC edit",
            CampaignOperation::EditSession => "session edit",
            CampaignOperation::AddSession => "new session",
            CampaignOperation::AddNpc => "new NPC",
        }
    }
}

impl std::fmt::Display for CampaignOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CampaignError {
    #[error("Completion request for {operation} failed: {source}")]
    #[diagnostic(
        code("CAMPAIGN::LLM_ERROR"),
        help("Check the API key and network connection, then try again")
    )]
    Llm {
        operation: CampaignOperation,
        #[source]
        source: LLMError,
    },

    #[error("AI returned invalid JSON for {operation}")]
    #[diagnostic(code("CAMPAIGN::INVALID_JSON"), help("Re-submit the request"))]
    InvalidJson {
        operation: CampaignOperation,
        #[source]
        source: serde_json::Error,
    },

    #[error("AI returned JSON of the wrong shape for {operation}: {source}")]
    #[diagnostic(code("CAMPAIGN::INVALID_SHAPE"), help("Re-submit the request"))]
    InvalidShape {
        operation: CampaignOperation,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    #[diagnostic(code("CAMPAIGN::VALIDATION"))]
    Validation(String),

    #[error("Another request is still running")]
    #[diagnostic(code("CAMPAIGN::BUSY"))]
    Busy,

    #[error("No campaign is selected")]
    #[diagnostic(code("CAMPAIGN::NO_ACTIVE"))]
    NoActiveCampaign,

    #[error("Not found: {0}")]
    #[diagnostic(code("CAMPAIGN::NOT_FOUND"))]
    NotFound(String),

    #[error(transparent)]
    #[diagnostic(code("CAMPAIGN::STORAGE"))]
    Storage(#[from] StorageError),

    #[error("Export failed for {path}: {source}")]
    #[diagnostic(code("CAMPAIGN::EXPORT"))]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CampaignError {
    /// Message suitable for the status line. Transport failures collapse
    /// into a generic line; invalid model output keeps its own wording.
    pub fn user_message(&self) -> String {
        match self {
            CampaignError::Llm {
                operation: CampaignOperation::Generate,
                ..
            } => "Failed to generate campaign.".to_string(),
            CampaignError::Llm { .. } => "Failed to apply AI edit.".to_string(),
            CampaignError::InvalidJson { operation, .. }
            | CampaignError::InvalidShape { operation, .. } => {
                format!("AI returned invalid JSON for {operation}.")
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CampaignError>;
