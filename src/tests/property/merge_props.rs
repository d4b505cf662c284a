//! Property tests for `merge_campaign_update`.

use proptest::prelude::*;

use crate::core::campaign::{merge_campaign_update, CampaignResult, CampaignUpdate, Npc, Session};

fn arb_session() -> impl Strategy<Value = Session> {
    (1u32..8, 1u32..8, prop::collection::vec(1u32..6, 0..3)).prop_map(|(id, number, npcs)| Session {
        id: format!("session{id}"),
        number,
        title: format!("Title {id}"),
        summary: format!("Summary {id}"),
        events: vec![],
        npcs: npcs.into_iter().map(|n| format!("npc-{n}")).collect(),
    })
}

fn arb_npc() -> impl Strategy<Value = Npc> {
    (1u32..6, any::<bool>(), any::<bool>()).prop_map(|(n, alive, is_bbeg)| Npc {
        id: format!("npc-{n}"),
        name: format!("Name {n}"),
        role: "Role".to_string(),
        alive,
        first_appears_in: None,
        notes: None,
        is_bbeg,
    })
}

/// Campaigns with unique session and NPC ids, sorted by number.
fn arb_campaign() -> impl Strategy<Value = CampaignResult> {
    (
        prop::collection::vec(arb_session(), 0..6),
        prop::collection::vec(arb_npc(), 0..5),
    )
        .prop_map(|(sessions, npcs)| {
            let mut seen = std::collections::HashSet::new();
            let mut sessions: Vec<Session> = sessions.into_iter().filter(|s| seen.insert(s.id.clone())).collect();
            sessions.sort_by_key(|s| s.number);
            let mut seen = std::collections::HashSet::new();
            let npcs = npcs.into_iter().filter(|n| seen.insert(n.id.clone())).collect();
            CampaignResult {
                id: "c".to_string(),
                title: "T".to_string(),
                summary: "S".to_string(),
                sessions,
                npcs,
            }
        })
}

fn arb_update() -> impl Strategy<Value = CampaignUpdate> {
    (
        prop::option::of("[a-z ]{0,12}"),
        prop::collection::vec(arb_session(), 0..3),
        prop::collection::vec(arb_npc(), 0..3),
        prop::collection::vec(1u32..10, 0..2),
        prop::option::of(1u32..8),
    )
        .prop_map(|(summary, sessions, npcs, deleted_sessions, deleted_npc)| {
            let mut seen = std::collections::HashSet::new();
            let sessions = sessions.into_iter().filter(|s| seen.insert(s.id.clone())).collect();
            let mut seen = std::collections::HashSet::new();
            let npcs = npcs.into_iter().filter(|n| seen.insert(n.id.clone())).collect();
            CampaignUpdate {
                summary,
                sessions,
                npcs,
                deleted_session_ids: deleted_sessions.into_iter().map(|n| format!("session{n}")).collect(),
                deleted_npc_id: deleted_npc.map(|n| format!("npc-{n}")),
            }
        })
}

proptest! {
    #[test]
    fn merged_sessions_are_sorted(campaign in arb_campaign(), update in arb_update()) {
        let merged = merge_campaign_update(&campaign, &update);
        prop_assert!(merged.sessions.windows(2).all(|w| w[0].number <= w[1].number));
    }

    #[test]
    fn merging_twice_changes_nothing(campaign in arb_campaign(), update in arb_update()) {
        let once = merge_campaign_update(&campaign, &update);
        let twice = merge_campaign_update(&once, &update);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_update_is_identity(campaign in arb_campaign()) {
        let merged = merge_campaign_update(&campaign, &CampaignUpdate::default());
        prop_assert_eq!(merged, campaign);
    }

    #[test]
    fn ids_stay_unique(campaign in arb_campaign(), update in arb_update()) {
        let merged = merge_campaign_update(&campaign, &update);
        let mut session_ids: Vec<&str> = merged.sessions.iter().map(|s| s.id.as_str()).collect();
        session_ids.sort_unstable();
        session_ids.dedup();
        prop_assert_eq!(session_ids.len(), merged.sessions.len());

        let mut npc_ids: Vec<&str> = merged.npcs.iter().map(|n| n.id.as_str()).collect();
        npc_ids.sort_unstable();
        npc_ids.dedup();
        prop_assert_eq!(npc_ids.len(), merged.npcs.len());
    }

    #[test]
    fn deleted_npc_is_gone_everywhere(campaign in arb_campaign(), update in arb_update()) {
        let merged = merge_campaign_update(&campaign, &update);
        if let Some(deleted) = update.deleted_npc_id.as_deref() {
            prop_assert!(merged.npc(deleted).is_none());
            prop_assert!(merged.sessions.iter().all(|s| !s.npcs.iter().any(|id| id == deleted)));
        }
    }

    #[test]
    fn unknown_deletions_are_ignored(campaign in arb_campaign()) {
        let update = CampaignUpdate {
            deleted_session_ids: vec!["session999".to_string()],
            deleted_npc_id: Some("npc-999".to_string()),
            ..CampaignUpdate::default()
        };
        prop_assert_eq!(merge_campaign_update(&campaign, &update), campaign);
    }

    #[test]
    fn untouched_records_survive(campaign in arb_campaign(), update in arb_update()) {
        let merged = merge_campaign_update(&campaign, &update);
        for session in &campaign.sessions {
            let replaced = update.sessions.iter().any(|s| s.id == session.id);
            let deleted = update.deleted_session_ids.contains(&session.id);
            let touched = update
                .deleted_npc_id
                .as_ref()
                .is_some_and(|npc| session.npcs.contains(npc));
            if !replaced && !deleted && !touched {
                prop_assert_eq!(merged.session(&session.id), Some(session));
            }
        }
    }
}
