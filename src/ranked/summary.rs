use serde::{Deserialize, Serialize};

use crate::engine::round::RoundOutcome;

/// Final tally of a completed ranked run.
///
/// Kept by the controller after completion so a failed leaderboard
/// submission can be retried without replaying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedRunSummary {
    pub score: u64,
    pub cards_played: u32,
    pub cards_correct: u32,
    pub best_streak: u32,
    pub outcomes: Vec<RoundOutcome>,
}

impl RankedRunSummary {
    pub fn emoji_grid(&self) -> String {
        self.outcomes
            .iter()
            .map(|outcome| match outcome {
                RoundOutcome::Correct => '🟩',
                RoundOutcome::TimedOut => '🟨',
                _ => '🟥',
            })
            .collect()
    }

    pub fn share_text(&self, play_url: Option<&str>) -> String {
        let mut text = format!(
            "🧛 CRUSADE - Ranked Score: {}\n🔥 Max Streak: {}\n{}",
            self.score,
            self.best_streak,
            self.emoji_grid()
        );
        if let Some(url) = play_url {
            text.push_str("\nPlay at: ");
            text.push_str(url);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn share_text_renders_grid() {
        let summary = RankedRunSummary {
            score: 412,
            cards_played: 4,
            cards_correct: 2,
            best_streak: 2,
            outcomes: vec![
                RoundOutcome::Correct,
                RoundOutcome::Correct,
                RoundOutcome::TimedOut,
                RoundOutcome::Incorrect,
            ],
        };
        assert_eq!(summary.emoji_grid(), "🟩🟩🟨🟥");
        let text = summary.share_text(Some("https://example.org/guess"));
        assert!(text.starts_with("🧛 CRUSADE - Ranked Score: 412\n🔥 Max Streak: 2\n"));
        assert!(text.ends_with("Play at: https://example.org/guess"));
        assert_round_trip_eq(&summary);
    }
}
