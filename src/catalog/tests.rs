#![cfg(test)]

use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::test_utils::fixtures::{sample_catalog, sample_dataset};
use crate::test_utils::serde::assert_round_trip_eq;

fn tier(value: u8) -> DifficultyTier {
    DifficultyTier::new(value).unwrap()
}

#[test]
fn cards_of_difficulty_returns_exact_tier_only() {
    let catalog = sample_catalog();
    for t in DifficultyTier::all() {
        for kind in [CardTypeFilter::Crypt, CardTypeFilter::Library, CardTypeFilter::All] {
            for card in catalog.cards_of_difficulty(t, kind) {
                assert_eq!(card.difficulty, t, "{} leaked into tier {t}", card.name);
                assert!(kind.admits(card.kind));
            }
        }
    }
    assert_eq!(catalog.cards_of_difficulty(tier(4), CardTypeFilter::Crypt).len(), 3);
    assert_eq!(catalog.cards_of_difficulty(tier(3), CardTypeFilter::All).len(), 6);
}

#[test]
fn dataset_arrays_assign_card_kind() {
    let catalog = sample_catalog();
    assert!(catalog.crypt().iter().all(Card::is_crypt));
    assert!(catalog.library().iter().all(|c| !c.is_crypt()));
    assert_eq!(catalog.get(CardId(200)).map(|c| c.name.as_str()), Some("Anson"));
    assert_eq!(
        catalog.find_by_name("eagles sight").map(|c| c.id),
        Some(CardId(102))
    );
}

#[test]
fn pick_reports_no_candidates_for_empty_tier() {
    let catalog = sample_catalog();
    let mut rng = StdRng::seed_from_u64(7);
    let filter = CardFilter::new(tier(5), CardTypeFilter::Crypt);
    let filter = CardFilter {
        include_imbued: false,
        ..filter
    };
    match catalog.pick(&filter, &mut rng) {
        Err(CatalogError::NoCandidates { tier: t, kind }) => {
            assert_eq!(t, tier(5));
            assert_eq!(kind, CardTypeFilter::Crypt);
        }
        other => panic!("expected NoCandidates, got {other:?}"),
    }
}

#[test]
fn empty_tier_is_an_empty_list_until_drawn() -> anyhow::Result<()> {
    let raw = r#"{"library": [{"id": 1, "name": "Blood Doll", "types": ["Master"], "difficulty": 1}]}"#;
    let catalog = CardCatalog::from_json_str(raw)?;
    assert!(catalog.cards_of_difficulty(tier(2), CardTypeFilter::Library).is_empty());

    let mut rng = StdRng::seed_from_u64(1);
    let filter = CardFilter::new(tier(2), CardTypeFilter::Library);
    assert!(matches!(
        catalog.pick(&filter, &mut rng),
        Err(CatalogError::NoCandidates { .. })
    ));
    Ok(())
}

#[test]
fn excluding_imbued_drops_hunters_and_conviction_cards() {
    let catalog = sample_catalog();
    let filter = CardFilter {
        include_imbued: false,
        ..CardFilter::new(tier(5), CardTypeFilter::All)
    };
    let names: Vec<_> = catalog.matching(&filter).iter().map(|c| c.name.clone()).collect();
    assert!(!names.contains(&"Sister Christine".to_string()));
    assert!(!names.contains(&"Determine".to_string()));
    assert!(names.contains(&"Cryptic Mission".to_string()));
}

#[test]
fn parses_dataset_json_with_loose_fields() -> anyhow::Result<()> {
    let raw = r#"{
        "metadata": {
            "total_decks_analyzed": 3000,
            "difficulty_levels": { "1": "Staples", "6": "Unknown" }
        },
        "crypt": [
            { "id": 200001, "name": "Anson", "slug": "anson", "types": ["Vampire"],
              "clan": "Ventrue", "capacity": 8, "group": 1, "count": 90, "difficulty": 1 }
        ],
        "library": [
            { "id": 100001, "name": "Blood Doll", "types": ["Master"], "poolCost": 1,
              "count": 0, "difficulty": 6 }
        ]
    }"#;
    let catalog = CardCatalog::from_json_str(raw)?;
    let anson = catalog.get(CardId(200001)).expect("crypt card");
    assert_eq!(anson.group.as_deref(), Some("1"));
    assert_eq!(anson.capacity, Some(8));
    let doll = catalog.get(CardId(100001)).expect("library card");
    assert_eq!(doll.difficulty, DifficultyTier::MAX);
    assert_eq!(doll.pool_cost.as_deref(), Some("1"));
    assert_eq!(catalog.level_label(tier(1)), Some("Staples"));
    Ok(())
}

#[test]
fn rejects_empty_dataset_and_bad_tiers() {
    assert!(matches!(
        CardCatalog::from_json_str(r#"{"crypt": [], "library": []}"#),
        Err(CatalogError::Empty)
    ));
    let bad = r#"{"library": [{"id": 1, "name": "X", "difficulty": 0}]}"#;
    assert!(matches!(
        CardCatalog::from_json_str(bad),
        Err(CatalogError::Parse(_))
    ));
}

#[test]
fn card_serde_round_trip() {
    let dataset = sample_dataset();
    for card in dataset.library.iter().take(3) {
        assert_round_trip_eq(card);
    }
}
