use serde::{Deserialize, Serialize};

/// A player's resolving input for the open round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerAction {
    /// Picked one of the displayed options, by label.
    Choose(String),
    /// Typed a free-text guess.
    Guess(String),
    Skip,
}
