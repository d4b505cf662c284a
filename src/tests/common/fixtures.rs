//! Test Fixtures
//!
//! Campaign data shared across tests, plus controllers wired to an in-memory
//! store and a scripted provider.

use std::sync::Arc;

use crate::core::campaign::{
    CampaignController, CampaignGenerator, CampaignResult, Npc, Session,
};
use crate::core::llm::provider::MockLLMProvider;
use crate::core::llm::CompletionClient;
use crate::core::storage::CampaignStore;
use crate::tests::mocks::scripted_provider;

pub const FIXTURE_CAMPAIGN_ID: &str = "campaign-fixture";

/// A fenced three-session generation reply, as a model typically sends it.
pub const GENERATED_CAMPAIGN_JSON: &str = r#"```json
{
  "title": "The Derelict Signal",
  "summary": "A salvage crew answers a distress call from a ship that should not exist.",
  "sessions": [
    {
      "id": "session1",
      "number": 1,
      "title": "Adrift",
      "summary": "The crew boards the silent freighter Kestrel.",
      "events": ["Docking under fire", "The logbook is missing"],
      "npcs": ["npc-1"]
    },
    {
      "id": "session2",
      "number": 2,
      "title": "Cold Storage",
      "summary": "Cryo pods hold passengers who were never listed.",
      "events": ["A pod opens on its own"],
      "npcs": ["npc-1", "npc-2"]
    },
    {
      "id": "session3",
      "number": 3,
      "title": "The Signal",
      "summary": "The beacon was a lure all along.",
      "events": ["The captain reveals herself"],
      "npcs": ["npc-2", "npc-3"]
    }
  ],
  "npcs": [
    {"id": "npc-1", "name": "Dex Harlan", "role": "Salvage broker", "alive": true, "firstAppearsIn": 1},
    {"id": "npc-2", "name": "Ilsa Varn", "role": "Survivor", "alive": true, "firstAppearsIn": 2, "notes": "Knows more than she says"},
    {"id": "npc-3", "name": "Captain Mora", "role": "Architect of the lure", "alive": true, "firstAppearsIn": 3, "isBBEG": true}
  ]
}
```"#;

pub fn session(number: u32, npcs: &[&str]) -> Session {
    Session {
        id: format!("session{number}"),
        number,
        title: format!("Session title {number}"),
        summary: format!("Session summary {number}"),
        events: vec![format!("Event {number}")],
        npcs: npcs.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn npc(n: u32, name: &str) -> Npc {
    Npc {
        id: format!("npc-{n}"),
        name: name.to_string(),
        role: "Townsfolk".to_string(),
        alive: true,
        first_appears_in: Some(1),
        notes: None,
        is_bbeg: false,
    }
}

/// Three sessions and four NPCs. "npc-3" appears in session 2 only and
/// "npc-4" is the BBEG.
pub fn sample_campaign() -> CampaignResult {
    let mut villain = npc(4, "The Hollow King");
    villain.is_bbeg = true;
    villain.first_appears_in = Some(3);

    CampaignResult {
        id: FIXTURE_CAMPAIGN_ID.to_string(),
        title: "Embers of Aldmoor".to_string(),
        summary: "A frontier town burns and nobody saw who lit it.".to_string(),
        sessions: vec![
            session(1, &["npc-1", "npc-2"]),
            session(2, &["npc-2", "npc-3"]),
            session(3, &["npc-1", "npc-4"]),
        ],
        npcs: vec![
            npc(1, "Sheriff Wren"),
            npc(2, "Old Tam"),
            npc(3, "Lise the Tinker"),
            villain,
        ],
    }
}

pub fn controller_with_provider(provider: MockLLMProvider, store: CampaignStore) -> CampaignController {
    let client = CompletionClient::new(Arc::new(provider));
    CampaignController::new(store, Arc::new(CampaignGenerator::new(client)))
}

/// Empty store; the provider answers with `replies` in order.
pub fn controller_with_replies(replies: Vec<String>) -> CampaignController {
    controller_with_provider(scripted_provider(replies), CampaignStore::in_memory())
}

/// A store holding `sample_campaign()`, loaded. When `select` is set the
/// fixture is also the active campaign.
pub fn seeded_controller(replies: Vec<String>, select: bool) -> CampaignController {
    let store = seeded_store(select);
    let mut controller = controller_with_provider(scripted_provider(replies), store);
    controller.load().unwrap();
    controller
}

pub fn seeded_store(select: bool) -> CampaignStore {
    let store = CampaignStore::in_memory();
    let campaign = sample_campaign();
    store.save_campaign(&campaign).unwrap();
    store.save_index(&[campaign.id.clone()]).unwrap();
    if select {
        store.save_selected(&campaign.id).unwrap();
    }
    store
}
