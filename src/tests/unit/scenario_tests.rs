//! End-to-end campaign scenarios: generate, delete an NPC, insert a session.

use crate::core::campaign::{
    merge_campaign_update, CampaignCommand, CampaignInput, CampaignUpdate, InsertPosition,
};
use crate::core::llm::strip_code_fence;
use crate::tests::common::*;

#[tokio::test]
async fn test_generate_three_session_sci_fi_campaign() {
    let mut controller = controller_with_replies(vec![GENERATED_CAMPAIGN_JSON.to_string()]);
    controller
        .execute(CampaignCommand::Generate(CampaignInput::new(
            "Sci-Fi",
            3,
            vec!["ship found adrift".into()],
        )))
        .await
        .unwrap();

    let campaign = controller.active().unwrap();
    let numbers: Vec<u32> = campaign.sessions.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(campaign.has_bbeg());
    assert!(campaign.dangling_npc_refs().is_empty());
    assert_eq!(controller.campaigns().len(), 1);
}

#[tokio::test]
async fn test_fenced_and_bare_generation_agree() {
    let bare = strip_code_fence(GENERATED_CAMPAIGN_JSON).to_string();
    let input = CampaignInput::new("Sci-Fi", 3, vec!["ship found adrift".into()]);

    let mut controller = controller_with_replies(vec![GENERATED_CAMPAIGN_JSON.to_string(), bare]);
    controller
        .execute(CampaignCommand::Generate(input.clone()))
        .await
        .unwrap();
    controller
        .execute(CampaignCommand::Generate(input))
        .await
        .unwrap();

    let [fenced, plain] = controller.campaigns() else {
        panic!("expected two campaigns");
    };
    assert_eq!(fenced.title, plain.title);
    assert_eq!(fenced.sessions, plain.sessions);
    assert_eq!(fenced.npcs, plain.npcs);
}

fn delete_npc_3() -> CampaignUpdate {
    serde_json::from_str(r#"{"deletedNpcId":"npc-3"}"#).unwrap()
}

#[test]
fn test_npc_deletion_strips_references() {
    let merged = merge_campaign_update(&sample_campaign(), &delete_npc_3());

    assert_eq!(merged.npcs.len(), 3);
    assert!(merged.npc("npc-3").is_none());
    assert_eq!(merged.session("session2").unwrap().npcs, vec!["npc-2".to_string()]);
    assert!(merged.dangling_npc_refs().is_empty());

    let json = serde_json::to_string(&merged).unwrap();
    assert!(!json.contains("deletedNpcId"));
    assert!(!json.contains("npc-3"));
}

#[tokio::test]
async fn test_npc_deletion_through_controller() {
    let mut controller = seeded_controller(vec![r#"{"deletedNpcId":"npc-3"}"#.to_string()], true);
    controller
        .execute(CampaignCommand::EditNpc {
            npc_id: "npc-3".into(),
            instruction: "Remove this character entirely".into(),
        })
        .await
        .unwrap();

    let active = controller.active().unwrap();
    assert_eq!(active.npcs.len(), 3);
    assert!(!active.session("session2").unwrap().npcs.contains(&"npc-3".to_string()));
}

fn insert_before_session_2() -> CampaignUpdate {
    let mut inserted = session(4, &["npc-1"]);
    inserted.number = 2;
    inserted.title = "The Long Road".into();

    let mut second = session(2, &["npc-2", "npc-3"]);
    second.number = 3;
    let mut third = session(3, &["npc-1", "npc-4"]);
    third.number = 4;

    CampaignUpdate {
        sessions: vec![inserted, second, third],
        ..CampaignUpdate::default()
    }
}

#[test]
fn test_session_insertion_renumbers_and_sorts() {
    let merged = merge_campaign_update(&sample_campaign(), &insert_before_session_2());

    let order: Vec<(&str, u32)> = merged
        .sessions
        .iter()
        .map(|s| (s.id.as_str(), s.number))
        .collect();
    assert_eq!(
        order,
        vec![
            ("session1", 1),
            ("session4", 2),
            ("session2", 3),
            ("session3", 4),
        ]
    );
    assert_eq!(merged.sessions[1].title, "The Long Road");
    assert!(merged.numbering_is_contiguous());
}

#[tokio::test]
async fn test_session_insertion_through_controller() {
    let reply = serde_json::to_string(&insert_before_session_2()).unwrap();
    let mut controller = seeded_controller(vec![reply], true);
    controller
        .execute(CampaignCommand::AddSession {
            anchor_session_id: "session2".into(),
            instruction: "A detour through the marshes".into(),
            position: InsertPosition::Before,
        })
        .await
        .unwrap();

    let active = controller.active().unwrap();
    assert_eq!(active.sessions.len(), 4);
    assert_eq!(active.sessions[1].id, "session4");
    let numbers: Vec<u32> = active.sessions.iter().map(|s| s.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}
