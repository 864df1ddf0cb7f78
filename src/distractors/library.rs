use rand::Rng;

use super::predicates::is_name_too_similar;
use super::take_from_buckets;
use crate::catalog::{Card, CardCatalog, CardKind};

const LOG_TARGET: &str = "crusade::distractors::library";

fn shares_discipline(a: &Card, b: &Card) -> bool {
    a.disciplines
        .iter()
        .any(|d| b.disciplines.iter().any(|o| o.eq_ignore_ascii_case(d)))
}

fn shares_type(a: &Card, b: &Card) -> bool {
    a.types.iter().any(|t| b.has_type(t))
}

fn same_types(a: &Card, b: &Card) -> bool {
    a.types.len() == b.types.len() && shares_all_types(a, b)
}

fn shares_all_types(a: &Card, b: &Card) -> bool {
    a.types.iter().all(|t| b.has_type(t))
}

/// Shared discipline, or both playable without one.
fn discipline_match(a: &Card, b: &Card) -> bool {
    if a.disciplines.is_empty() && b.disciplines.is_empty() {
        return true;
    }
    shares_discipline(a, b)
}

fn cost_of(card: &Card) -> Option<(u8, u32)> {
    let parse = |raw: &Option<String>| raw.as_deref().map(|c| c.trim().parse::<u32>().unwrap_or(0));
    parse(&card.pool_cost)
        .map(|v| (0, v))
        .or_else(|| parse(&card.blood_cost).map(|v| (1, v)))
        .or_else(|| parse(&card.conviction_cost).map(|v| (2, v)))
}

/// Same cost currency within one point, or both free.
fn similar_cost(a: &Card, b: &Card) -> bool {
    match (cost_of(a), cost_of(b)) {
        (None, None) => true,
        (Some((ka, va)), Some((kb, vb))) => ka == kb && va.abs_diff(vb) <= 1,
        _ => false,
    }
}

/// Wrong answers for a library target.
///
/// Curated names are used first, in authored order; the remainder comes from
/// progressively looser semantic buckets. Names too similar to the target are
/// rejected at every stage.
pub fn library_distractors<'a, R: Rng + ?Sized>(
    target: &Card,
    catalog: &'a CardCatalog,
    premium: &[String],
    want: usize,
    rng: &mut R,
) -> Vec<&'a Card> {
    let acceptable = |c: &Card| c.id != target.id && !is_name_too_similar(&target.name, &c.name);

    let pool = catalog.library();
    let mut curated: Vec<&'a Card> = Vec::new();
    for name in premium {
        match catalog
            .find_by_name(name)
            .filter(|c| c.kind == CardKind::Library)
        {
            Some(card) if acceptable(card) => curated.push(card),
            Some(card) => {
                tracing::debug!(target: LOG_TARGET, target_id = %target.id, rejected = %card.name, "curated distractor rejected");
            }
            None => {
                tracing::debug!(target: LOG_TARGET, target_id = %target.id, missing = %name, "curated distractor not in pool");
            }
        }
    }

    let candidates: Vec<&'a Card> = pool.iter().filter(|c| acceptable(c)).collect();
    let bucket = |keep: &dyn Fn(&Card) -> bool| -> Vec<&'a Card> {
        candidates.iter().copied().filter(|c| keep(c)).collect()
    };

    let mut buckets = vec![curated];
    buckets.extend([
        bucket(&|c| {
            same_types(target, c)
                && discipline_match(target, c)
                && c.difficulty == target.difficulty
                && similar_cost(target, c)
        }),
        bucket(&|c| same_types(target, c) && discipline_match(target, c) && c.difficulty == target.difficulty),
        bucket(&|c| same_types(target, c) && discipline_match(target, c)),
        bucket(&|c| shares_discipline(target, c) || shares_type(target, c)),
        candidates.clone(),
    ]);

    take_from_buckets(target, buckets, want, rng)
}
