//! Property tests for overlap resolution, unmasking and round trips.

use std::collections::HashMap;

use proptest::prelude::*;
use veil::ranges::{self, Range};
use veil::test_utils::test_builder;

fn range_strategy(len: usize) -> impl Strategy<Value = Range> {
    (0..=len, 0..=8usize).prop_map(move |(start, width)| {
        Range::new(start, (start + width).min(len + 2), "#")
    })
}

proptest! {
    #[test]
    fn resolved_ranges_never_overlap(
        ranges in prop::collection::vec(range_strategy(40), 0..30)
    ) {
        let text = "a".repeat(40);
        let kept = ranges::resolve(&text, ranges.clone());

        for pair in kept.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        for range in &kept {
            prop_assert!(range.start < range.end && range.end <= text.len());
        }

        // Every valid range that was dropped overlaps an accepted one at
        // least as long.
        for range in ranges.iter().filter(|r| r.start < r.end && r.end <= text.len()) {
            if !kept.contains(range) {
                prop_assert!(kept.iter().any(|k| k.overlaps(range) && k.len() >= range.len()));
            }
        }
    }

    #[test]
    fn applying_resolved_ranges_matches_manual_splice(
        ranges in prop::collection::vec(range_strategy(30), 0..10)
    ) {
        let text: String = ('a'..='z').chain('A'..='D').collect();
        let (rendered, kept) = ranges::rewrite(&text, ranges);

        let mut expected = String::new();
        let mut cursor = 0;
        for range in &kept {
            expected.push_str(&text[cursor..range.start]);
            expected.push_str(&range.replacement);
            cursor = range.end;
        }
        expected.push_str(&text[cursor..]);
        prop_assert_eq!(rendered, expected);
    }

    #[test]
    fn unmask_without_tokens_in_text_is_identity(text in "[a-z ,.]{0,80}") {
        let tokens = HashMap::from([("MASKWORD_ZZZZ".to_string(), "x".to_string())]);
        prop_assert_eq!(veil::unmask(&text, &tokens), text);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn word_masking_round_trips(text in "[a-z]{1,8}( [a-z]{1,8}){0,10}", pick in 0..4usize) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let words: Vec<String> = text
            .split_whitespace()
            .skip(pick)
            .step_by(2)
            .map(str::to_string)
            .collect();

        let (masked, restored) = runtime.block_on(async {
            let masker = test_builder().build().await.unwrap();
            let masked = masker
                .mask_selected_words(&text, &words, "prop", true)
                .await
                .unwrap();
            let restored = masker.unmask_namespace(&masked.text, "prop").await;
            (masked, restored)
        });

        prop_assert_eq!(restored, text.clone());
        for word in words.iter().filter(|w| w.len() >= 3) {
            let standalone = masked.text.split_whitespace().any(|w| w == word);
            prop_assert!(!standalone, "{} still present in {}", word, masked.text);
        }
    }
}

fn mixed_text() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof!["[a-z]{1,6}", "[0-9]{1,4}"],
        1..16,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn number_selection_round_trips_among_other_numbers(
        parts in mixed_text(),
        picks in prop::collection::vec(any::<bool>(), 16),
    ) {
        let text = parts.join(", ");
        let selected: Vec<String> = parts
            .iter()
            .zip(&picks)
            .filter(|(part, pick)| **pick && part.starts_with(|c: char| c.is_ascii_digit()))
            .map(|(part, _)| part.clone())
            .collect();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (masked, restored) = runtime.block_on(async {
            let masker = test_builder().build().await.unwrap();
            let masked = masker
                .select_mask(&text, &selected, "prop", None)
                .await
                .unwrap();
            let restored = masker.unmask_namespace(&masked.text, "prop").await;
            (masked, restored)
        });

        prop_assert_eq!(restored, text.clone());
        let remaining: Vec<&str> = masked.text.split(", ").collect();
        for number in &selected {
            prop_assert!(
                !remaining.contains(&number.as_str()),
                "{} still present in {}",
                number,
                masked.text
            );
        }
    }
}
