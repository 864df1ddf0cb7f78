use super::types::{Card, DifficultyTier};

/// Cumulative popularity cut-offs for tiers 1 through 4. Used cards beyond the
/// last cut-off, and every card with zero recorded usage, land in tier 5.
pub const TIER_CUTOFFS: [f64; 4] = [0.10, 0.25, 0.50, 0.85];

/// Tier for a card ranked `rank` (0 = most played) among `total_used` cards
/// with non-zero usage.
pub fn tier_for_usage(rank: usize, count: u32, total_used: usize) -> DifficultyTier {
    if count == 0 || total_used == 0 {
        return DifficultyTier::MAX;
    }
    let percentile = (rank + 1) as f64 / total_used as f64;
    let value = TIER_CUTOFFS
        .iter()
        .position(|cutoff| percentile <= *cutoff)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(5);
    DifficultyTier::new(value).unwrap_or(DifficultyTier::MAX)
}

/// Re-derives tiers for a pool from its usage counts, most played first.
pub fn retier(cards: &[Card]) -> Vec<(usize, DifficultyTier)> {
    let mut used: Vec<usize> = (0..cards.len()).filter(|&i| cards[i].count > 0).collect();
    used.sort_by(|&a, &b| cards[b].count.cmp(&cards[a].count));
    let total_used = used.len();

    let mut tiers = vec![DifficultyTier::MAX; cards.len()];
    for (rank, &idx) in used.iter().enumerate() {
        tiers[idx] = tier_for_usage(rank, cards[idx].count, total_used);
    }
    tiers.into_iter().enumerate().collect()
}

/// Cards per tier, index 0 = tier 1.
pub fn tier_histogram<'a>(cards: impl IntoIterator<Item = &'a Card>) -> [usize; 5] {
    let mut histogram = [0usize; 5];
    for card in cards {
        histogram[(card.difficulty.value() - 1) as usize] += 1;
    }
    histogram
}
