//! Property tests for input normalization and reply unfencing.

use proptest::prelude::*;

use crate::core::campaign::CampaignInput;
use crate::core::llm::strip_code_fence;

proptest! {
    #[test]
    fn normalized_beats_are_never_blank(beats in prop::collection::vec("[ a-z]{0,6}", 0..6)) {
        let input = CampaignInput::new(" Horror ", 4, beats);
        let normalized = input.normalized();
        prop_assert_eq!(normalized.genre.as_str(), "Horror");
        prop_assert!(normalized.beats.iter().all(|b| !b.is_empty() && b.trim() == b.as_str()));
    }

    #[test]
    fn normalizing_twice_is_stable(beats in prop::collection::vec("[ a-z]{0,6}", 0..6)) {
        let once = CampaignInput::new("Horror", 4, beats).normalized();
        prop_assert_eq!(once.normalized(), once);
    }

    #[test]
    fn beats_error_iff_all_blank(beats in prop::collection::vec("[ a-z]{0,6}", 0..6)) {
        let input = CampaignInput::new("Horror", 4, beats);
        let all_blank = input.normalized().beats.is_empty();
        prop_assert_eq!(input.validate().beats.is_some(), all_blank);
    }

    #[test]
    fn unfenced_body_matches_fenced(body in "\\{\"[a-z]{1,8}\":[0-9]{1,4}\\}") {
        let fenced = format!("```json\n{body}\n```");
        prop_assert_eq!(strip_code_fence(&fenced), body.as_str());
        prop_assert_eq!(strip_code_fence(&body), body.as_str());
    }
}
