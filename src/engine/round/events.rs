use serde::{Deserialize, Serialize};

use crate::catalog::{CardId, DifficultyTier};

use super::types::{RoundId, RoundOutcome};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundEvent {
    Presented {
        round_id: RoundId,
        card_id: CardId,
        tier: DifficultyTier,
        options: usize,
    },
    Resolved {
        round_id: RoundId,
        card_id: CardId,
        outcome: RoundOutcome,
        points: u32,
    },
    StreakReset {
        previous: u32,
    },
    NewBestStreak {
        streak: u32,
    },
    Abandoned {
        round_id: RoundId,
    },
    RunCompleted {
        score: u64,
        correct: u32,
        played: u32,
    },
}
