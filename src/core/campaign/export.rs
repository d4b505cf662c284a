//! Plain-text campaign export.

use std::fs;
use std::path::{Path, PathBuf};

use super::error::{CampaignError, Result};
use super::types::{CampaignResult, Npc, Session};

const RULE: &str = "========================";

/// Render a campaign as human-readable text.
pub fn format_campaign_text(campaign: &CampaignResult) -> String {
    let mut sessions: Vec<&Session> = campaign.sessions.iter().collect();
    sessions.sort_by_key(|s| s.number);

    let session_text = sessions
        .iter()
        .map(|s| format_session(campaign, s))
        .collect::<Vec<_>>()
        .join("\n\n");

    let npc_text = campaign
        .npcs
        .iter()
        .map(format_npc)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Title: {}\n\nSummary:\n{}\n\n{RULE}\nSessions\n{RULE}\n\n{}\n\n{RULE}\nNPCs\n{RULE}\n\n{}",
        campaign.title, campaign.summary, session_text, npc_text
    )
    .trim()
    .to_string()
}

fn format_session(campaign: &CampaignResult, session: &Session) -> String {
    let mut lines = vec![
        format!("Session {}: {}", session.number, session.title),
        format!("Summary: {}", session.summary),
        "Events:".to_string(),
    ];
    lines.extend(session.events.iter().map(|e| format!("- {e}")));

    let names: Vec<&str> = session.npcs.iter().map(|id| campaign.npc_name(id)).collect();
    lines.push(format!("NPCs Involved: {}", names.join(", ")));
    lines.join("\n")
}

fn format_npc(npc: &Npc) -> String {
    let mut lines = vec![
        if npc.is_bbeg {
            format!("{} ({}) [BBEG]", npc.name, npc.role)
        } else {
            format!("{} ({})", npc.name, npc.role)
        },
        format!("Status: {}", if npc.alive { "Alive" } else { "Deceased" }),
    ];
    if let Some(first) = npc.first_appears_in {
        lines.push(format!("First Appears In: Session {first}"));
    }
    if let Some(notes) = npc.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.push(format!("Notes: {notes}"));
    }
    lines.join("\n")
}

/// Normalize a user-entered export name: trimmed, path separators replaced,
/// ".txt" appended when missing.
pub fn export_filename(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CampaignError::Validation("Filename cannot be empty".to_string()));
    }
    let safe: String = trimmed
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if safe.ends_with(".txt") {
        Ok(safe)
    } else {
        Ok(format!("{safe}.txt"))
    }
}

/// Write the text export into `dir` and return the file path.
pub fn write_export(dir: &Path, name: &str, campaign: &CampaignResult) -> Result<PathBuf> {
    let filename = export_filename(name)?;
    fs::create_dir_all(dir).map_err(|source| CampaignError::Export {
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(filename);
    fs::write(&path, format_campaign_text(campaign)).map_err(|source| CampaignError::Export {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Exported campaign {} to {}", campaign.id, path.display());
    Ok(path)
}
