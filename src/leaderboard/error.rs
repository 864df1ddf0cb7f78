#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("leaderboard request failed: {0}")]
    Transport(String),
    #[error("malformed leaderboard row: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("leaderboard backend error: {0}")]
    Backend(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
}

impl LeaderboardError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Transport and backend failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Backend(_))
    }
}
