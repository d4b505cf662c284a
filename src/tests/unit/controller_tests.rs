//! Tests for `CampaignController`: validation, the busy flag, failure
//! isolation and persistence through a file-backed store.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use crate::core::campaign::{
    CampaignCommand, CampaignError, CampaignInput, CampaignOperation, InsertPosition,
};
use crate::core::storage::{
    CampaignStore, FileKvStore, KeyValueStore, MemoryKvStore, StorageError, StorageKey,
};
use crate::tests::common::*;
use crate::tests::mocks::{recording_provider, scripted_provider, unreachable_provider};

fn file_store(dir: &Path) -> CampaignStore {
    CampaignStore::new(FileKvStore::open(dir).unwrap())
}

/// Shares a memory store but refuses writes to one key.
struct RefusingKvStore {
    inner: Arc<MemoryKvStore>,
    refused: String,
}

impl KeyValueStore for RefusingKvStore {
    fn get(&self, key: &str) -> crate::core::storage::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> crate::core::storage::Result<()> {
        if key == self.refused {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> crate::core::storage::Result<()> {
        self.inner.remove(key)
    }
}

fn sci_fi_input() -> CampaignInput {
    CampaignInput::new("Sci-Fi", 3, vec!["ship found adrift".into(), "  ".into()])
}

fn npc_rename_reply() -> String {
    r#"{"npcs":[{"id":"npc-2","name":"Tam the Elder","role":"Hermit","alive":true,"firstAppearsIn":1}]}"#
        .to_string()
}

// ============================================================================
// Validation and busy state
// ============================================================================

#[test]
fn test_invalid_input_never_reaches_provider() {
    let mut controller = controller_with_provider(unreachable_provider(), CampaignStore::in_memory());

    let err = controller
        .prepare(CampaignCommand::Generate(CampaignInput::new("", 0, vec![])))
        .err()
        .unwrap();

    assert!(matches!(err, CampaignError::Validation(_)));
    assert!(!controller.is_busy());
    assert!(controller.error().unwrap().contains("Must enter a genre"));
    assert!(controller.last_input().is_none());
}

#[test]
fn test_blank_instruction_is_rejected() {
    let mut controller = seeded_controller(vec![], true);
    let err = controller
        .prepare(CampaignCommand::AddNpc {
            instruction: "   ".into(),
        })
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Instruction cannot be empty");
    assert!(!controller.is_busy());
}

#[test]
fn test_unknown_targets_are_not_found() {
    let mut controller = seeded_controller(vec![], true);
    let err = controller
        .prepare(CampaignCommand::EditNpc {
            npc_id: "npc-99".into(),
            instruction: "x".into(),
        })
        .err()
        .unwrap();
    assert!(matches!(err, CampaignError::NotFound(_)));

    let err = controller
        .prepare(CampaignCommand::AddSession {
            anchor_session_id: "session99".into(),
            instruction: "x".into(),
            position: InsertPosition::After,
        })
        .err()
        .unwrap();
    assert!(matches!(err, CampaignError::NotFound(_)));
}

#[test]
fn test_edits_need_an_active_campaign() {
    let mut controller = seeded_controller(vec![], false);
    let err = controller
        .prepare(CampaignCommand::AddNpc {
            instruction: "a bard".into(),
        })
        .err()
        .unwrap();
    assert!(matches!(err, CampaignError::NoActiveCampaign));
}

#[tokio::test]
async fn test_second_request_is_rejected_while_busy() {
    let mut controller = controller_with_replies(vec![GENERATED_CAMPAIGN_JSON.to_string()]);

    let pending = controller
        .prepare(CampaignCommand::Generate(sci_fi_input()))
        .unwrap();
    assert_eq!(controller.busy_operation(), Some(CampaignOperation::Generate));

    let second = controller.prepare(CampaignCommand::Generate(sci_fi_input()));
    assert!(matches!(second, Err(CampaignError::Busy)));
    // A rejected duplicate does not overwrite the in-flight request's state.
    assert!(controller.error().is_none());

    let completed = pending.run().await;
    controller.apply(completed).unwrap();
    assert!(!controller.is_busy());
}

// ============================================================================
// Failures leave state untouched
// ============================================================================

#[tokio::test]
async fn test_generate_failure_reports_and_keeps_list() {
    let mut controller = controller_with_replies(vec![]);
    let err = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CampaignError::Llm {
            operation: CampaignOperation::Generate,
            ..
        }
    ));
    assert_eq!(controller.error(), Some("Failed to generate campaign."));
    assert!(controller.campaigns().is_empty());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn test_edit_failure_leaves_campaign_and_store_untouched() {
    let dir = TempDir::new().unwrap();
    let seed = file_store(dir.path());
    let campaign = sample_campaign();
    seed.save_campaign(&campaign).unwrap();
    seed.save_index(&[campaign.id.clone()]).unwrap();
    seed.save_selected(&campaign.id).unwrap();

    let mut controller = controller_with_provider(scripted_provider(vec![]), file_store(dir.path()));
    controller.load().unwrap();

    let err = controller
        .execute(CampaignCommand::EditNpc {
            npc_id: "npc-2".into(),
            instruction: "rename him".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Failed to apply AI edit.");
    assert_eq!(controller.active(), Some(&campaign));
    assert_eq!(
        file_store(dir.path()).load_campaign(&campaign.id).unwrap(),
        Some(campaign)
    );
}

#[tokio::test]
async fn test_wrong_shape_is_reported_as_invalid_json() {
    let mut controller = controller_with_replies(vec![r#"{"title": 5}"#.to_string()]);
    let err = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap_err();

    assert!(matches!(err, CampaignError::InvalidShape { .. }));
    assert_eq!(
        controller.error(),
        Some("AI returned invalid JSON for campaign generation.")
    );
}

// ============================================================================
// Successful commands persist
// ============================================================================

#[tokio::test]
async fn test_generate_persists_indexes_and_selects() {
    let dir = TempDir::new().unwrap();
    let mut controller = controller_with_provider(
        scripted_provider(vec![GENERATED_CAMPAIGN_JSON.to_string()]),
        file_store(dir.path()),
    );

    let id = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap();

    assert_eq!(controller.selected_id(), Some(id.as_str()));
    assert_eq!(controller.active().unwrap().title, "The Derelict Signal");

    let reopened = file_store(dir.path());
    assert_eq!(reopened.load_index().unwrap(), vec![id.clone()]);
    assert_eq!(reopened.load_selected().unwrap(), Some(id.clone()));
    assert!(reopened.load_campaign(&id).unwrap().is_some());

    // The remembered form input is normalized.
    let remembered = reopened.load_last_input().unwrap().unwrap();
    assert_eq!(remembered.beats, vec!["ship found adrift".to_string()]);
}

#[tokio::test]
async fn test_failed_index_write_leaves_no_campaign_file() {
    let kv = Arc::new(MemoryKvStore::new());
    let store = CampaignStore::new(RefusingKvStore {
        inner: Arc::clone(&kv),
        refused: StorageKey::CampaignIndex.as_key(),
    });
    let mut controller = controller_with_provider(
        scripted_provider(vec![GENERATED_CAMPAIGN_JSON.to_string()]),
        store,
    );

    let err = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap_err();

    assert!(matches!(err, CampaignError::Storage(_)));
    assert!(controller.campaigns().is_empty());
    assert!(controller.selected_id().is_none());
    assert!(!controller.is_busy());
    assert!(kv.keys().iter().all(|k| !k.starts_with("campaign_") || k == "campaign_input"));
}

#[tokio::test]
async fn test_generated_ids_are_unique() {
    let mut controller = controller_with_replies(vec![
        GENERATED_CAMPAIGN_JSON.to_string(),
        GENERATED_CAMPAIGN_JSON.to_string(),
    ]);
    let first = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap();
    let second = controller
        .execute(CampaignCommand::Generate(sci_fi_input()))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(controller.campaigns().len(), 2);
    assert_eq!(controller.selected_id(), Some(second.as_str()));
}

#[tokio::test]
async fn test_npc_edit_replaces_only_that_npc() {
    let mut controller = seeded_controller(vec![npc_rename_reply()], true);
    controller
        .execute(CampaignCommand::EditNpc {
            npc_id: "npc-2".into(),
            instruction: "make him a hermit".into(),
        })
        .await
        .unwrap();

    let active = controller.active().unwrap();
    let edited = active.npc("npc-2").unwrap();
    assert_eq!(edited.name, "Tam the Elder");
    assert_eq!(edited.role, "Hermit");
    assert_eq!(active.npcs.len(), 4);
    assert_eq!(active.npc("npc-1"), sample_campaign().npc("npc-1"));
    assert_eq!(active.sessions, sample_campaign().sessions);
}

#[tokio::test]
async fn test_edit_prompt_carries_campaign_and_instruction() {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let provider = recording_provider(&npc_rename_reply(), Arc::clone(&prompts));
    let mut controller = controller_with_provider(provider, seeded_store(true));
    controller.load().unwrap();

    controller
        .execute(CampaignCommand::EditNpc {
            npc_id: "npc-2".into(),
            instruction: "make him a hermit".into(),
        })
        .await
        .unwrap();

    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Target NPC: \"npc-2\""));
    assert!(prompts[0].contains("make him a hermit"));
    assert!(prompts[0].contains("Embers of Aldmoor"));
}

// ============================================================================
// Direct edits
// ============================================================================

#[test]
fn test_select_unknown_campaign() {
    let mut controller = seeded_controller(vec![], false);
    assert!(matches!(
        controller.select("nope"),
        Err(CampaignError::NotFound(_))
    ));
    controller.select(FIXTURE_CAMPAIGN_ID).unwrap();
    assert_eq!(controller.active().unwrap().id, FIXTURE_CAMPAIGN_ID);
}

#[test]
fn test_delete_selected_clears_store() {
    let dir = TempDir::new().unwrap();
    let seed = file_store(dir.path());
    let campaign = sample_campaign();
    seed.save_campaign(&campaign).unwrap();
    seed.save_index(&[campaign.id.clone()]).unwrap();
    seed.save_selected(&campaign.id).unwrap();

    let mut controller = controller_with_provider(unreachable_provider(), file_store(dir.path()));
    controller.load().unwrap();
    let removed = controller.delete_selected().unwrap();

    assert_eq!(removed.id, campaign.id);
    assert!(controller.campaigns().is_empty());
    assert!(controller.selected_id().is_none());

    let reopened = file_store(dir.path());
    assert!(reopened.load_index().unwrap().is_empty());
    assert!(reopened.load_selected().unwrap().is_none());
    assert!(reopened.load_campaign(&campaign.id).unwrap().is_none());

    assert!(matches!(
        controller.delete_selected(),
        Err(CampaignError::NoActiveCampaign)
    ));
}

#[test]
fn test_update_title_summary() {
    let mut controller = seeded_controller(vec![], true);
    let err = controller.update_title_summary("  ", "whatever").unwrap_err();
    assert_eq!(err.to_string(), "Title cannot be empty");

    controller
        .update_title_summary(" Ash and Ember ", " A new summary. ")
        .unwrap();
    let active = controller.active().unwrap();
    assert_eq!(active.title, "Ash and Ember");
    assert_eq!(active.summary, "A new summary.");
    assert_eq!(active.sessions.len(), 3);
}

#[test]
fn test_export_selected_writes_text() {
    let dir = TempDir::new().unwrap();
    let controller = seeded_controller(vec![], true);

    let path = controller
        .export_selected(dir.path(), "aldmoor notes")
        .unwrap();
    assert_eq!(path, dir.path().join("aldmoor notes.txt"));

    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.starts_with("Title: Embers of Aldmoor"));
    assert!(text.contains("The Hollow King"));
}

#[test]
fn test_load_drops_unreadable_entries() {
    let dir = TempDir::new().unwrap();
    let kv = FileKvStore::open(dir.path()).unwrap();
    let good = sample_campaign();
    kv.set(
        &format!("campaign_{}", good.id),
        &serde_json::to_string(&good).unwrap(),
    )
    .unwrap();
    kv.set("campaign_broken", "{not json").unwrap();
    kv.set(
        "campaigns",
        &serde_json::to_string(&[good.id.as_str(), "broken", "missing"]).unwrap(),
    )
    .unwrap();
    kv.set("selected_campaign_id", "\"missing\"").unwrap();

    let mut controller = controller_with_provider(unreachable_provider(), file_store(dir.path()));
    controller.load().unwrap();

    assert_eq!(controller.campaigns().len(), 1);
    assert!(controller.selected_id().is_none());
    assert_eq!(
        file_store(dir.path()).load_index().unwrap(),
        vec![good.id.clone()]
    );
}
