use crate::ranked::{RANKED_PHASES, RANKED_RUN_LENGTH};
use crate::scoring::{RANKED_CARD_VALUES, RANKED_STREAK_STEPS};

use super::error::LeaderboardError;
use super::types::{LeaderboardMode, ScoreSubmission};

pub const MAX_PAGE_SIZE: usize = 100;

/// Upper bound for a ranked run: every card answered at the top multiplier.
pub fn max_ranked_score() -> u64 {
    let top_multiplier = RANKED_STREAK_STEPS
        .iter()
        .map(|(_, m)| *m)
        .fold(1.0_f64, f64::max);
    RANKED_PHASES
        .iter()
        .map(|(tier, count)| {
            let value = RANKED_CARD_VALUES[(*tier - 1) as usize] as f64;
            (value * top_multiplier).round() as u64 * *count as u64
        })
        .sum()
}

pub fn validate_submission(submission: &ScoreSubmission) -> Result<(), LeaderboardError> {
    if submission.cards_correct > submission.cards_played {
        return Err(LeaderboardError::validation(
            "cards_correct cannot exceed cards_played",
        ));
    }
    if submission.best_streak > submission.cards_correct {
        return Err(LeaderboardError::validation(
            "best_streak cannot exceed cards_correct",
        ));
    }
    if submission.mode == LeaderboardMode::Ranked {
        if submission.cards_played as usize > RANKED_RUN_LENGTH {
            return Err(LeaderboardError::validation(format!(
                "ranked runs have at most {RANKED_RUN_LENGTH} cards"
            )));
        }
        if submission.score > max_ranked_score() {
            return Err(LeaderboardError::validation("ranked score exceeds maximum"));
        }
    }
    Ok(())
}

pub fn validate_page(limit: usize) -> Result<(), LeaderboardError> {
    if limit == 0 || limit > MAX_PAGE_SIZE {
        return Err(LeaderboardError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    Ok(())
}
