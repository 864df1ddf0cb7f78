#![cfg(test)]

use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::catalog::{CardCatalog, CardKind};
use crate::engine::round::InvariantCheck;
use crate::test_utils::fixtures::{library_card, sample_catalog};

#[test]
fn phase_split_favours_library() {
    assert_eq!(phase_split(6), (5, 1));
    assert_eq!(phase_split(5), (4, 1));
    assert_eq!(phase_split(4), (3, 1));
    assert_eq!(phase_split(3), (2, 1));
    assert_eq!(phase_split(2), (2, 0));
}

#[test]
fn playlist_has_fixed_shape() -> anyhow::Result<()> {
    let catalog = sample_catalog();
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let playlist = RankedPlaylist::build(&catalog, true, &mut rng)?;
        assert_eq!(playlist.len(), RANKED_RUN_LENGTH);
        playlist.validate_invariants().expect("playlist invariants");

        for (value, count) in RANKED_PHASES {
            let phase: Vec<_> = playlist
                .entries()
                .iter()
                .filter(|e| e.tier.value() == value)
                .collect();
            let library = phase.iter().filter(|e| e.card.kind == CardKind::Library).count();
            assert_eq!(phase.len(), count);
            assert_eq!((library, count - library), phase_split(count));
        }
    }
    Ok(())
}

#[test]
fn base_values_follow_tier() -> anyhow::Result<()> {
    let catalog = sample_catalog();
    let mut rng = StdRng::seed_from_u64(1);
    let playlist = RankedPlaylist::build(&catalog, true, &mut rng)?;
    assert_eq!(playlist.entries()[0].base_value, 10);
    assert_eq!(playlist.entries()[19].base_value, 80);
    assert_eq!(playlist.base_total(), 6 * 10 + 5 * 20 + 4 * 30 + 3 * 50 + 2 * 80);
    Ok(())
}

#[test]
fn short_tier_fails_build() {
    let catalog = CardCatalog::from_dataset(crate::catalog::CardDataset {
        library: vec![library_card(1, "Blood Doll", 1, &["Master"], &[])],
        ..Default::default()
    })
    .expect("catalog");
    let mut rng = StdRng::seed_from_u64(1);
    match RankedPlaylist::build(&catalog, true, &mut rng) {
        Err(PlaylistError::InsufficientCards { needed, available, .. }) => {
            assert_eq!(needed, 6);
            assert_eq!(available, 1);
        }
        Ok(_) => panic!("build should fail"),
    }
}

#[test]
fn missing_crypt_is_backfilled_from_library() -> anyhow::Result<()> {
    let mut dataset = crate::test_utils::fixtures::sample_dataset();
    dataset.crypt.retain(|c| c.difficulty.value() != 1);
    let catalog = CardCatalog::from_dataset(dataset)?;
    let mut rng = StdRng::seed_from_u64(9);
    let playlist = RankedPlaylist::build(&catalog, true, &mut rng)?;
    let tier_one = &playlist.entries()[..6];
    assert!(tier_one.iter().all(|e| e.card.kind == CardKind::Library));
    Ok(())
}
