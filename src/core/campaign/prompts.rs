//! Prompt construction for campaign generation and edits.
//!
//! Every builder is a pure function: it states the task, embeds the current
//! campaign as pretty-printed JSON when editing, spells out the exact JSON
//! the model must return and forbids any text around it.

use std::fmt::Write;

use super::types::{CampaignInput, CampaignResult, InsertPosition};

const JSON_ONLY: &str =
    "Respond with the JSON document only. Do not add explanations, headings or Markdown around it.";

const SESSION_SCHEMA: &str = r#"{
  "id": string,
  "number": number,
  "title": string,
  "summary": string,
  "events": string[],
  "npcs": string[]
}"#;

const NPC_SCHEMA: &str = r#"{
  "id": string,
  "name": string,
  "role": string,
  "alive": boolean,
  "firstAppearsIn": number,
  "notes"?: string,
  "isBBEG"?: boolean
}"#;

fn campaign_json(campaign: &CampaignResult) -> String {
    serde_json::to_string_pretty(campaign).unwrap_or_else(|e| {
        log::warn!("Could not serialize campaign {} for prompt: {e}", campaign.id);
        String::from("{}")
    })
}

fn editor_preamble(out: &mut String, campaign: &CampaignResult) {
    out.push_str("You are the campaign editor for a tabletop role-playing game.\n\n");
    out.push_str("Current campaign data:\n");
    out.push_str(&campaign_json(campaign));
    out.push_str("\n\n");
}

/// Prompt for a brand-new campaign.
pub fn generate_campaign_prompt(input: &CampaignInput) -> String {
    let mut out = String::new();
    out.push_str("You are a Game Master designing a structured tabletop role-playing campaign.\n\n");
    let _ = writeln!(out, "Genre: {}", input.genre);
    let _ = writeln!(out, "Length: {} sessions", input.length);
    out.push_str("Story beats, in order:\n");
    for (i, beat) in input.beats.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, beat);
    }

    out.push_str("\nRequirements:\n");
    let _ = writeln!(
        out,
        "- Tell one continuous story across exactly {} sessions, hitting the story beats in the order given.",
        input.length
    );
    out.push_str("- Give every session an \"id\" such as \"session1\" and a \"number\" starting at 1.\n");
    out.push_str("- Each session \"summary\" covers the key events, the conflicts or decisions, and how they resolve, in three to five sentences or more. Refer to NPCs by full name, never by id.\n");
    out.push_str("- Each session lists short \"events\" strings and the ids of the NPCs that actually take part in them.\n");
    out.push_str("- Every NPC referenced by a session must appear in the \"npcs\" array.\n");
    out.push_str("- NPC ids follow the pattern \"npc-1\", \"npc-2\" and so on. They never change once assigned.\n");
    out.push_str("- Each NPC has \"name\", \"role\", \"alive\" and \"firstAppearsIn\" (a session number), plus optional \"notes\".\n");
    out.push_str("- At least one NPC is the central antagonist: mark it with \"isBBEG\": true, describe the villainy in its \"role\", and involve it in at least one session.\n");

    out.push_str("\nReturn JSON with this shape:\n");
    let _ = writeln!(
        out,
        "{{\n\"title\": string,\n\"summary\": string,\n\"sessions\": [{SESSION_SCHEMA}],\n\"npcs\": [{NPC_SCHEMA}]\n}}"
    );
    out.push('\n');
    out.push_str(JSON_ONLY);
    out
}

/// Prompt for editing or removing one NPC.
pub fn npc_edit_prompt(campaign: &CampaignResult, npc_id: &str, instruction: &str) -> String {
    let is_bbeg = campaign.npc(npc_id).map(|n| n.is_bbeg).unwrap_or(false);

    let mut out = String::new();
    editor_preamble(&mut out, campaign);
    let _ = writeln!(
        out,
        "Target NPC: \"{npc_id}\". This NPC {} the campaign's central antagonist (BBEG).",
        if is_bbeg { "is" } else { "is not" }
    );
    let _ = writeln!(out, "\nInstruction:\n{instruction}\n");
    out.push_str("You may change the NPC's attributes, remove the NPC entirely, rewrite the sessions it appears in, and revise the campaign summary when the change affects the main arc.\n\n");
    out.push_str("If the NPC is removed: leave it out of \"npcs\", drop its id from every session's \"npcs\" list, and put its id in \"deletedNpcId\".\n\n");
    out.push_str("Return only the changed parts:\n");
    let _ = writeln!(
        out,
        "{{\n\"summary\"?: string,\n\"sessions\": [ changed sessions, each {SESSION_SCHEMA} ],\n\"npcs\": [ the edited NPC, {NPC_SCHEMA} ],\n\"deletedNpcId\"?: string\n}}"
    );
    out.push('\n');
    out.push_str(JSON_ONLY);
    out
}

/// Prompt for adding a new NPC.
pub fn add_npc_prompt(campaign: &CampaignResult, instruction: &str) -> String {
    let next_id = campaign.next_npc_id();

    let mut out = String::new();
    editor_preamble(&mut out, campaign);
    let _ = writeln!(out, "Instruction:\n{instruction}\n");
    out.push_str("Add one new NPC to the campaign.\n");
    let _ = writeln!(out, "- Its id is \"{next_id}\".");
    out.push_str("- Give it a fitting \"name\", a \"role\" describing its job, temperament or importance, \"alive\", and \"firstAppearsIn\" chosen from the story or the instruction. \"notes\" is optional.\n");
    out.push_str("- Set \"isBBEG\": true only when the instruction makes it a main antagonist.\n");
    out.push_str("- Return only the sessions it appears in, with its id added to their \"npcs\" list and the summary or events adjusted where it takes part.\n");
    out.push_str("- Return a new campaign \"summary\" only if the arc changes.\n\n");
    out.push_str("Return JSON with this shape:\n");
    let _ = writeln!(
        out,
        "{{\n\"summary\"?: string,\n\"sessions\": [ changed sessions, each {SESSION_SCHEMA} ],\n\"npcs\": [ the new NPC only, {NPC_SCHEMA} ]\n}}"
    );
    out.push('\n');
    out.push_str(JSON_ONLY);
    out
}

/// Prompt for editing or removing one session.
pub fn session_edit_prompt(campaign: &CampaignResult, session_id: &str, instruction: &str) -> String {
    let mut out = String::new();
    editor_preamble(&mut out, campaign);
    let _ = writeln!(out, "Target session: \"{session_id}\".");
    let _ = writeln!(out, "\nInstruction:\n{instruction}\n");
    out.push_str("Update that session so its \"summary\" matches the changed events, and keep its \"npcs\" list to the NPCs that take part. Adjust affected NPCs, and revise the campaign summary when the change is major. Keep the wider story consistent.\n\n");
    out.push_str("To remove a session, put its id in \"deletedSessionIds\".\n\n");
    out.push_str("Return only the changed parts:\n");
    let _ = writeln!(
        out,
        "{{\n\"summary\"?: string,\n\"sessions\": [ the edited session, {SESSION_SCHEMA} ],\n\"npcs\": [ affected NPCs, each {NPC_SCHEMA} ],\n\"deletedSessionIds\"?: string[]\n}}"
    );
    out.push('\n');
    out.push_str(JSON_ONLY);
    out
}

/// Session number a new session takes when placed relative to `anchor_session_id`.
/// Unknown anchors append to the end. Saturates at `u32::MAX`.
pub fn insert_number(campaign: &CampaignResult, anchor_session_id: &str, position: InsertPosition) -> u32 {
    match campaign.session(anchor_session_id) {
        Some(anchor) => match position {
            InsertPosition::Before => anchor.number,
            InsertPosition::After => anchor.number.saturating_add(1),
        },
        None => u32::try_from(campaign.sessions.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1),
    }
}

/// Prompt for inserting a session next to an existing one.
pub fn add_session_prompt(
    campaign: &CampaignResult,
    anchor_session_id: &str,
    instruction: &str,
    position: InsertPosition,
) -> String {
    let number = insert_number(campaign, anchor_session_id, position);
    let new_id = campaign.free_session_id(number);
    let anchor = campaign
        .session(anchor_session_id)
        .map(|s| format!("Session {} (\"{}\")", s.number, s.title))
        .unwrap_or_else(|| "the last session".to_string());

    let mut out = String::new();
    editor_preamble(&mut out, campaign);
    let _ = writeln!(out, "Instruction:\n{instruction}\n");
    let _ = writeln!(
        out,
        "Insert one new session {} {anchor}.",
        position.as_str().to_uppercase()
    );
    let _ = writeln!(
        out,
        "- It becomes session number {number}. Every existing session numbered {number} or higher moves up by one; return each of those with its new \"number\" and unchanged \"id\"."
    );
    let _ = writeln!(out, "- Its id is \"{new_id}\".");
    let _ = writeln!(
        out,
        "- It must follow naturally {} the anchor session and include a \"title\", a detailed \"summary\" of at least three to five sentences, key \"events\" and the ids of involved NPCs.",
        position.as_str()
    );
    let next_npc = campaign.next_npc_id();
    let _ = writeln!(
        out,
        "- New NPCs, if any, continue the id sequence from \"{next_npc}\" and use {number} as \"firstAppearsIn\"."
    );
    out.push_str("- Return a new campaign \"summary\" only if the arc changes significantly.\n\n");
    out.push_str("Return JSON with this shape:\n");
    let _ = writeln!(
        out,
        "{{\n\"summary\"?: string,\n\"sessions\": [ the new session and every renumbered one, each {SESSION_SCHEMA} ],\n\"npcs\"?: [ new or changed NPCs, each {NPC_SCHEMA} ]\n}}"
    );
    out.push('\n');
    out.push_str(JSON_ONLY);
    out
}
