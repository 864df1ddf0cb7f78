use crate::catalog::{CardTypeFilter, DifficultyTier};

use super::types::HintKind;

#[derive(Debug, PartialEq, Eq)]
pub enum ActionError {
    NoOpenRound,
    SkipNotAllowedInRanked,
    HintsNotAllowedInRanked,
    HintUnavailable(HintKind),
    UnknownOption,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StateError {
    InvalidTransition,
    InvariantViolation(&'static str),
    NoCandidates {
        tier: DifficultyTier,
        kind: CardTypeFilter,
    },
}

pub trait InvariantCheck {
    fn validate_invariants(&self) -> Result<(), StateError>;
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionError::NoOpenRound => write!(f, "no round is awaiting an answer"),
            ActionError::SkipNotAllowedInRanked => write!(f, "ranked rounds cannot be skipped"),
            ActionError::HintsNotAllowedInRanked => write!(f, "hints are disabled in ranked mode"),
            ActionError::HintUnavailable(kind) => write!(f, "{kind:?} hint unavailable for this card"),
            ActionError::UnknownOption => write!(f, "choice is not one of the displayed options"),
        }
    }
}

impl std::error::Error for ActionError {}

impl std::fmt::Display for StateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateError::InvalidTransition => write!(f, "invalid round transition"),
            StateError::InvariantViolation(what) => write!(f, "invariant violated: {what}"),
            StateError::NoCandidates { tier, kind } => {
                write!(f, "no {kind:?} cards at difficulty {tier}")
            }
        }
    }
}

impl std::error::Error for StateError {}
