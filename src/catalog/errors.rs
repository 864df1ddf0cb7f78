use super::types::{CardTypeFilter, DifficultyTier};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read card dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed card dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("difficulty tier {0} is outside 1..=5")]
    InvalidTier(u8),
    #[error("card dataset contains no cards")]
    Empty,
    #[error("no {kind:?} cards at difficulty {tier}")]
    NoCandidates {
        tier: DifficultyTier,
        kind: CardTypeFilter,
    },
    #[error("invalid catalog input: {0}")]
    Invalid(String),
}

impl CatalogError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
