use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::Card;
use crate::distractors::OptionSet;
use crate::scoring::HintUsage;

use super::errors::{InvariantCheck, StateError};

pub type RoundId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Casual,
    Ranked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    Pending,
    Correct,
    Incorrect,
    Skipped,
    /// Ranked answer window expired. Scored like an incorrect answer.
    TimedOut,
}

impl RoundOutcome {
    pub fn is_resolved(self) -> bool {
        self != RoundOutcome::Pending
    }

    pub fn is_correct(self) -> bool {
        self == RoundOutcome::Correct
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    CardType,
    /// Disciplines for library cards, clan for crypt cards.
    Discipline,
    Capacity,
    Initials,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Selecting,
    Presenting,
    Answered,
    /// Answered correctly with an auto-advance pending.
    Advancing,
    RunComplete,
}

/// Running totals for one run. Casual stats outlive a session through
/// [`crate::stats::StatsStore`]; ranked stats are scoped to one playlist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub streak: u32,
    pub best_streak: u32,
    pub score: u64,
    pub played: u32,
    pub correct: u32,
}

impl RunStats {
    pub fn record_correct(&mut self, points: u32) {
        self.streak += 1;
        self.best_streak = self.best_streak.max(self.streak);
        self.score += u64::from(points);
        self.played += 1;
        self.correct += 1;
    }

    pub fn record_miss(&mut self) {
        self.streak = 0;
        self.played += 1;
    }

    pub fn accuracy(&self) -> f64 {
        if self.played == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(self.played)
        }
    }
}

impl InvariantCheck for RunStats {
    fn validate_invariants(&self) -> Result<(), StateError> {
        if self.correct > self.played {
            return Err(StateError::InvariantViolation("correct exceeds played"));
        }
        if self.streak > self.best_streak {
            return Err(StateError::InvariantViolation("streak exceeds best streak"));
        }
        if self.best_streak > self.correct {
            return Err(StateError::InvariantViolation("best streak exceeds correct"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub card: Card,
    pub options: OptionSet,
    pub outcome: RoundOutcome,
    pub hints: HintUsage,
    pub hints_shown: Vec<HintKind>,
    pub points: u32,
    /// Position in the ranked playlist.
    pub position: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    pub distractor_count: usize,
    pub casual_lookahead: usize,
    pub auto_advance_delay: Duration,
    pub ranked_answer_window: Duration,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            distractor_count: crate::distractors::DEFAULT_DISTRACTOR_COUNT,
            casual_lookahead: 5,
            auto_advance_delay: Duration::from_millis(1500),
            ranked_answer_window: Duration::from_secs(10),
        }
    }
}
