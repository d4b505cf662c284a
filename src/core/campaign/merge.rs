//! Reconciles a partial update into the canonical campaign.

use indexmap::IndexMap;

use super::types::{CampaignResult, CampaignUpdate, Npc, Session};

/// Apply `update` to `original` and return the new campaign.
///
/// Sessions and NPCs are upserted by id with full-record replacement, the
/// update's deletions are applied, and sessions come back sorted by number
/// (stable for equal numbers). NPCs keep insertion order. Unknown ids in the
/// deletion fields are ignored, and surviving references are not checked.
/// Session numbers are taken as given; gaps or repeats are not repaired.
pub fn merge_campaign_update(original: &CampaignResult, update: &CampaignUpdate) -> CampaignResult {
    let mut sessions: IndexMap<&str, Session> = original
        .sessions
        .iter()
        .map(|s| (s.id.as_str(), s.clone()))
        .collect();

    for session in &update.sessions {
        sessions.insert(session.id.as_str(), session.clone());
    }

    for id in &update.deleted_session_ids {
        sessions.shift_remove(id.as_str());
    }

    if let Some(deleted) = update.deleted_npc_id.as_deref() {
        for session in sessions.values_mut() {
            session.npcs.retain(|id| id != deleted);
        }
    }

    let mut npcs: IndexMap<&str, Npc> = original
        .npcs
        .iter()
        .map(|n| (n.id.as_str(), n.clone()))
        .collect();

    for npc in &update.npcs {
        npcs.insert(npc.id.as_str(), npc.clone());
    }

    if let Some(deleted) = update.deleted_npc_id.as_deref() {
        npcs.shift_remove(deleted);
    }

    let mut sessions: Vec<Session> = sessions.into_values().collect();
    sessions.sort_by_key(|s| s.number);

    CampaignResult {
        id: original.id.clone(),
        title: original.title.clone(),
        summary: update
            .summary
            .clone()
            .unwrap_or_else(|| original.summary.clone()),
        sessions,
        npcs: npcs.into_values().collect(),
    }
}
