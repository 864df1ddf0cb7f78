use async_trait::async_trait;

use super::error::LeaderboardError;
use super::types::{LeaderboardEntry, LeaderboardMode, PlayerId};

mod in_memory;
mod supabase;

pub use in_memory::InMemoryLeaderboardStorage;
pub use supabase::{SupabaseConfig, SupabaseLeaderboardStorage};

#[async_trait]
pub trait LeaderboardStorage: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn LeaderboardTxn + Send>, LeaderboardError>;
}

#[async_trait]
pub trait LeaderboardTxn: Send {
    async fn load_entry(
        &mut self,
        player: PlayerId,
        mode: LeaderboardMode,
    ) -> Result<Option<LeaderboardEntry>, LeaderboardError>;

    async fn upsert_entry(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError>;

    /// Entries in `mode` with a score strictly above `score`.
    async fn count_above(&mut self, mode: LeaderboardMode, score: u64)
        -> Result<u32, LeaderboardError>;

    /// Highest scores first; ties keep the earliest update first.
    async fn top_entries(
        &mut self,
        mode: LeaderboardMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError>;

    async fn commit(self: Box<Self>) -> Result<(), LeaderboardError>;
    async fn rollback(self: Box<Self>);
}
