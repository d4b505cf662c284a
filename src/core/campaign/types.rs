//! Campaign data model.
//!
//! JSON field names follow the camelCase shape the model is asked to
//! produce, which is also the persisted shape.

use serde::{Deserialize, Deserializer, Serialize};

/// Genres offered by the creation form. "Other" unlocks a free-text genre.
pub const GENRE_OPTIONS: &[&str] = &[
    "Apocalyptic",
    "Comedy",
    "Cyberpunk",
    "Dark Fantasy",
    "Dieselpunk",
    "Espionage",
    "Fantasy",
    "Gothic Horror",
    "Historical",
    "Horror",
    "Lovecraftian",
    "Martial Arts",
    "Mecha",
    "Modern Day",
    "Mystery",
    "Noir",
    "Post-Apocalyptic",
    "Psychological Thriller",
    "Romance",
    "Sci-Fi",
    "Space Opera",
    "Steampunk",
    "Superhero",
    "Survival",
    "Swashbuckling",
    "Urban Fantasy",
    "Western",
    "Other",
];

pub const CUSTOM_GENRE: &str = "Other";
pub const MIN_LENGTH: u32 = 1;
pub const MAX_LENGTH: u32 = 100;

// ============================================================================
// Input
// ============================================================================

/// What the user asks for when creating a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInput {
    pub genre: String,
    /// Number of sessions.
    pub length: u32,
    pub beats: Vec<String>,
}

/// Per-field validation messages for [`CampaignInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputErrors {
    pub genre: Option<String>,
    pub length: Option<String>,
    pub beats: Option<String>,
}

impl InputErrors {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.length.is_none() && self.beats.is_none()
    }

    pub fn messages(&self) -> Vec<&str> {
        [&self.genre, &self.length, &self.beats]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect()
    }
}

impl CampaignInput {
    pub fn new(genre: impl Into<String>, length: u32, beats: Vec<String>) -> Self {
        Self {
            genre: genre.into(),
            length,
            beats,
        }
    }

    /// Trim the genre and drop blank beats.
    pub fn normalized(&self) -> Self {
        Self {
            genre: self.genre.trim().to_string(),
            length: self.length,
            beats: self
                .beats
                .iter()
                .map(|b| b.trim())
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn validate(&self) -> InputErrors {
        let mut errors = InputErrors::default();
        if self.genre.trim().is_empty() {
            errors.genre = Some("Must enter a genre".to_string());
        }
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            errors.length = Some(format!(
                "Length must be between {MIN_LENGTH} and {MAX_LENGTH} sessions"
            ));
        }
        if self.beats.iter().all(|b| b.trim().is_empty()) {
            errors.beats = Some("Must have at least 1 story beat".to_string());
        }
        errors
    }
}

// ============================================================================
// Campaign
// ============================================================================

/// One story unit within a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier. Never changes when the session is renumbered.
    pub id: String,
    /// Display order, starting at 1.
    pub number: u32,
    pub title: String,
    pub summary: String,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub events: Vec<String>,
    /// NPC ids involved in this session.
    #[serde(default, deserialize_with = "nullable_vec")]
    pub npcs: Vec<String>,
}

/// A non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Npc {
    /// "npc-N", assigned once and never reused.
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_appears_in: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        rename = "isBBEG",
        default,
        skip_serializing_if = "std::ops::Not::not",
        deserialize_with = "nullable_bool"
    )]
    pub is_bbeg: bool,
}

fn default_alive() -> bool {
    true
}

/// A complete campaign as persisted and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignResult {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub sessions: Vec<Session>,
    pub npcs: Vec<Npc>,
}

impl CampaignResult {
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    /// Display name for an NPC id, falling back to the id itself.
    pub fn npc_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.npc(id).map(|n| n.name.as_str()).unwrap_or(id)
    }

    pub fn has_bbeg(&self) -> bool {
        self.npcs.iter().any(|n| n.is_bbeg)
    }

    /// `(session id, npc id)` pairs whose NPC is missing from the roster.
    pub fn dangling_npc_refs(&self) -> Vec<(&str, &str)> {
        self.sessions
            .iter()
            .flat_map(|s| {
                s.npcs
                    .iter()
                    .filter(|id| self.npc(id).is_none())
                    .map(move |id| (s.id.as_str(), id.as_str()))
            })
            .collect()
    }

    /// True when session numbers run 1..=len without gaps or repeats.
    pub fn numbering_is_contiguous(&self) -> bool {
        let mut numbers: Vec<u32> = self.sessions.iter().map(|s| s.number).collect();
        numbers.sort_unstable();
        numbers.iter().zip(1u32..).all(|(n, expected)| *n == expected)
    }

    /// Next free "npc-N" id: one past the highest N, or the lowest unused N
    /// once the highest is `u32::MAX`.
    pub fn next_npc_id(&self) -> String {
        let max = self
            .npcs
            .iter()
            .filter_map(|n| npc_number(&n.id))
            .max()
            .unwrap_or(0);
        let n = max.checked_add(1).unwrap_or_else(|| {
            (1..=u32::MAX)
                .find(|n| self.npc(&format!("npc-{n}")).is_none())
                .unwrap_or(u32::MAX)
        });
        format!("npc-{n}")
    }

    /// A "sessionN" id not used by any existing session, starting at `preferred`
    /// and wrapping to 1 past `u32::MAX`.
    pub fn free_session_id(&self, preferred: u32) -> String {
        let start = preferred.max(1);
        (start..=u32::MAX)
            .chain(1..start)
            .map(|n| format!("session{n}"))
            .find(|candidate| self.session(candidate).is_none())
            .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()))
    }
}

/// Numeric suffix of an "npc-N" id.
pub fn npc_number(id: &str) -> Option<u32> {
    id.strip_prefix("npc-")?.parse().ok()
}

/// A freshly generated campaign before it has been assigned an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCampaign {
    pub title: String,
    pub summary: String,
    pub sessions: Vec<Session>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub npcs: Vec<Npc>,
}

impl GeneratedCampaign {
    pub fn into_campaign(self, id: impl Into<String>) -> CampaignResult {
        let mut sessions = self.sessions;
        sessions.sort_by_key(|s| s.number);
        CampaignResult {
            id: id.into(),
            title: self.title,
            summary: self.summary,
            sessions,
            npcs: self.npcs,
        }
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// A partial campaign returned by an edit. Sessions and NPCs listed here
/// replace the stored records with the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub sessions: Vec<Session>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub npcs: Vec<Npc>,
    #[serde(default, deserialize_with = "nullable_vec", skip_serializing_if = "Vec::is_empty")]
    pub deleted_session_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_npc_id: Option<String>,
}

impl CampaignUpdate {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.sessions.is_empty()
            && self.npcs.is_empty()
            && self.deleted_session_ids.is_empty()
            && self.deleted_npc_id.is_none()
    }
}

/// Where a new session goes relative to its anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    #[default]
    After,
}

impl InsertPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertPosition::Before => "before",
            InsertPosition::After => "after",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            InsertPosition::Before => InsertPosition::After,
            InsertPosition::After => InsertPosition::Before,
        }
    }
}

impl std::fmt::Display for InsertPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}
