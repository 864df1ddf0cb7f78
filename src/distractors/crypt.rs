use rand::Rng;

use super::predicates::are_clans_related;
use super::take_from_buckets;
use crate::catalog::Card;

/// Capacity window, in blood, for a "close" crypt distractor.
pub const CAPACITY_WINDOW: u8 = 2;

fn close_capacity(target: &Card, candidate: &Card) -> bool {
    match (target.capacity, candidate.capacity) {
        (Some(a), Some(b)) => a.abs_diff(b) <= CAPACITY_WINDOW,
        _ => false,
    }
}

fn compatible_gender(target: &Card, candidate: &Card) -> bool {
    match target.gender.as_deref() {
        None | Some("?") | Some("") => true,
        Some(gender) => candidate.gender.as_deref() == Some(gender),
    }
}

/// Wrong answers for a crypt target, clan-related first.
///
/// Crypt names are never filtered for similarity: many vampires share a
/// surname or a title, so only exact duplicate display names are dropped.
pub fn crypt_distractors<'a, R: Rng + ?Sized>(
    target: &Card,
    pool: &'a [Card],
    want: usize,
    rng: &mut R,
) -> Vec<&'a Card> {
    let candidates: Vec<&Card> = pool.iter().filter(|c| c.id != target.id).collect();
    let related = |c: &Card| are_clans_related(target.clan.as_deref(), c.clan.as_deref());
    let same_imbued = |c: &Card| c.is_imbued() == target.is_imbued();

    let bucket = |keep: &dyn Fn(&Card) -> bool| -> Vec<&'a Card> {
        candidates.iter().copied().filter(|c| keep(c)).collect()
    };

    let buckets = vec![
        bucket(&|c| {
            related(c)
                && same_imbued(c)
                && close_capacity(target, c)
                && compatible_gender(target, c)
                && c.difficulty == target.difficulty
        }),
        bucket(&|c| related(c) && same_imbued(c) && close_capacity(target, c)),
        bucket(&|c| related(c) && same_imbued(c)),
        bucket(&related),
        bucket(&same_imbued),
        candidates.clone(),
    ];

    take_from_buckets(target, buckets, want, rng)
}
