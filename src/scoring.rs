//! Pure point curves for casual and ranked rounds.

use serde::{Deserialize, Serialize};

use crate::catalog::DifficultyTier;

/// Casual base points, index 0 = tier 1.
pub const CASUAL_BASE_POINTS: [u32; 5] = [20, 50, 100, 200, 400];
pub const HINT_PENALTY: u32 = 10;
pub const INITIALS_PENALTY: u32 = 25;
/// A correct answer is never worth less than this, however many hints.
pub const MIN_CORRECT_POINTS: u32 = 5;

/// Ranked per-card value, index 0 = tier 1.
pub const RANKED_CARD_VALUES: [u32; 5] = [10, 20, 30, 50, 80];

/// (minimum streak, multiplier), highest threshold first.
pub const CASUAL_STREAK_STEPS: [(u32, f64); 2] = [(10, 3.0), (5, 2.0)];
pub const RANKED_STREAK_STEPS: [(u32, f64); 3] = [(15, 1.3), (10, 1.2), (5, 1.1)];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintUsage {
    pub hints_used: u32,
    pub initials_used: bool,
}

fn step_multiplier(streak: u32, steps: &[(u32, f64)]) -> f64 {
    steps
        .iter()
        .find(|(threshold, _)| streak >= *threshold)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

pub fn casual_base_points(tier: DifficultyTier) -> u32 {
    CASUAL_BASE_POINTS[(tier.value() - 1) as usize]
}

pub fn casual_streak_multiplier(streak: u32) -> f64 {
    step_multiplier(streak, &CASUAL_STREAK_STEPS)
}

/// Points for a correct casual answer.
///
/// `streak` is the streak *including* this answer.
pub fn score(hints: HintUsage, streak: u32, tier: DifficultyTier) -> u32 {
    let penalty = hints.hints_used.saturating_mul(HINT_PENALTY)
        + if hints.initials_used { INITIALS_PENALTY } else { 0 };
    let base = casual_base_points(tier)
        .saturating_sub(penalty)
        .max(MIN_CORRECT_POINTS);
    (base as f64 * casual_streak_multiplier(streak)).round() as u32
}

pub fn ranked_card_value(tier: DifficultyTier) -> u32 {
    RANKED_CARD_VALUES[(tier.value() - 1) as usize]
}

pub fn ranked_streak_multiplier(prior_streak: u32) -> f64 {
    step_multiplier(prior_streak, &RANKED_STREAK_STEPS)
}

/// Points for a correct ranked answer; `prior_streak` excludes this answer.
pub fn ranked_points(tier: DifficultyTier, prior_streak: u32) -> u32 {
    (ranked_card_value(tier) as f64 * ranked_streak_multiplier(prior_streak)).round() as u32
}
