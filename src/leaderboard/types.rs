use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::round::{GameMode, RunStats};
use crate::ranked::RankedRunSummary;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Leaderboard partition. Casual play is stored as `normal`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardMode {
    Normal,
    Ranked,
}

impl LeaderboardMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LeaderboardMode::Normal => "normal",
            LeaderboardMode::Ranked => "ranked",
        }
    }
}

impl From<GameMode> for LeaderboardMode {
    fn from(mode: GameMode) -> Self {
        match mode {
            GameMode::Casual => LeaderboardMode::Normal,
            GameMode::Ranked => LeaderboardMode::Ranked,
        }
    }
}

impl std::str::FromStr for LeaderboardMode {
    type Err = super::error::LeaderboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(LeaderboardMode::Normal),
            "ranked" => Ok(LeaderboardMode::Ranked),
            other => Err(super::error::LeaderboardError::validation(format!(
                "invalid mode `{other}`, expected normal or ranked"
            ))),
        }
    }
}

/// Identity established by the external auth layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedPlayer {
    pub id: PlayerId,
    pub display_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub mode: LeaderboardMode,
    pub score: u64,
    pub cards_played: u32,
    pub cards_correct: u32,
    pub best_streak: u32,
}

impl ScoreSubmission {
    pub fn casual(stats: &RunStats) -> Self {
        Self {
            mode: LeaderboardMode::Normal,
            score: stats.score,
            cards_played: stats.played,
            cards_correct: stats.correct,
            best_streak: stats.best_streak,
        }
    }
}

impl From<&RankedRunSummary> for ScoreSubmission {
    fn from(summary: &RankedRunSummary) -> Self {
        Self {
            mode: LeaderboardMode::Ranked,
            score: summary.score,
            cards_played: summary.cards_played,
            cards_correct: summary.cards_correct,
            best_streak: summary.best_streak,
        }
    }
}

/// One player's best run in one mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "user_id")]
    pub player_id: PlayerId,
    #[serde(default)]
    pub display_name: Option<String>,
    pub mode: LeaderboardMode,
    pub score: u64,
    pub cards_played: u32,
    pub cards_correct: u32,
    pub best_streak: u32,
    pub games_played: u32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    /// True when the submission became the stored best.
    pub updated: bool,
    /// Rank of the stored best after reconciliation, 1-based.
    pub rank: u32,
    pub best_score: u64,
    pub games_played: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: u32,
    pub entry: LeaderboardEntry,
}
