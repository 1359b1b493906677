//! Tests that the planted RUN is recovered from generated cards across tiers and seeds.
#![allow(clippy::expect_used)]

use proptest::prelude::*;
use runscan_bench::{GeneratorConfig, SizeTier, SyntheticCard, generate_card, generate_cards};
use runscan_core::{Extractor, Tier, extract_national_id, is_valid_national_id};

fn assert_planted_found(cards: &[SyntheticCard], label: &str) {
    for (i, card) in cards.iter().enumerate() {
        assert_eq!(
            extract_national_id(&card.text).as_deref(),
            Some(card.planted.as_str()),
            "{label}/card={i}:\n{}",
            card.text
        );
    }
}

#[test]
fn small_cards_yield_planted_run() {
    for seed in [42, 123, 999, 7777, 54321] {
        let cards = generate_cards(&SizeTier::Small.config(seed));
        assert_planted_found(&cards, &format!("Small/seed={seed}"));
    }
}

#[test]
fn medium_cards_yield_planted_run() {
    for seed in [42, 123, 999] {
        let cards = generate_cards(&SizeTier::Medium.config(seed));
        assert_planted_found(&cards, &format!("Medium/seed={seed}"));
    }
}

#[test]
fn large_cards_yield_planted_run() {
    let cards = generate_cards(&SizeTier::Large.config(42));
    assert_planted_found(&cards, "Large/seed=42");
}

#[test]
fn planted_run_is_checksum_valid() {
    for card in generate_cards(&SizeTier::Medium.config(5)) {
        assert!(is_valid_national_id(&card.planted), "{}", card.planted);
    }
}

#[test]
fn planted_run_wins_the_unlabelled_pass() {
    let extractor = Extractor::default();
    for card in generate_cards(&SizeTier::Small.config(11)) {
        let found = extractor.extract(&card.text).expect("planted run");
        assert_eq!(found.tier, Tier::Unlabelled, "{}", card.text);
    }
}

#[test]
fn generation_is_deterministic() {
    let a = generate_cards(&SizeTier::Medium.config(42));
    let b = generate_cards(&SizeTier::Medium.config(42));
    assert_eq!(a, b, "same seed must produce identical output");
}

#[test]
fn different_seeds_differ() {
    let a = generate_card(&SizeTier::Small.config(1));
    let b = generate_card(&SizeTier::Small.config(2));
    assert_ne!(a.text, b.text);
}

#[test]
fn all_lowercase_cards_still_extract() {
    let config = GeneratorConfig {
        lowercase_ratio: 1.0,
        ..SizeTier::Medium.config(8)
    };
    let cards = generate_cards(&config);
    assert!(
        cards
            .iter()
            .all(|c| !c.text.contains("RUN ") && !c.text.contains("RUT "))
    );
    assert_planted_found(&cards, "lowercase");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_seed_yields_planted_run(
        seed in any::<u64>(),
        noise_lines in 0usize..60,
        num_decoys in 0usize..10,
        valid_serial_ratio in 0.0f64..=1.0,
    ) {
        let config = GeneratorConfig {
            seed,
            num_cards: 1,
            noise_lines,
            num_decoys,
            valid_serial_ratio,
            lowercase_ratio: 0.5,
        };
        let card = generate_card(&config);
        prop_assert_eq!(extract_national_id(&card.text), Some(card.planted));
    }
}
