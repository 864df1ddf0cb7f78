//! Per-player best scores for casual (`normal`) and ranked play.
//!
//! Each player holds at most one row per mode. Ranks are competition ranks:
//! one plus the number of rows with a strictly higher score, so ties share.

pub mod error;
pub mod service;
pub mod storage;
pub mod types;
pub mod validation;

pub use error::LeaderboardError;
pub use service::{reconcile, LeaderboardGateway, LeaderboardService};
pub use storage::{InMemoryLeaderboardStorage, SupabaseConfig, SupabaseLeaderboardStorage};
pub use types::*;
pub use validation::{max_ranked_score, validate_page, validate_submission, MAX_PAGE_SIZE};
