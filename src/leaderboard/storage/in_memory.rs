use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{LeaderboardStorage, LeaderboardTxn};
use crate::leaderboard::error::LeaderboardError;
use crate::leaderboard::types::{LeaderboardEntry, LeaderboardMode, PlayerId};

type EntryKey = (PlayerId, LeaderboardMode);

#[derive(Default)]
struct Inner {
    entries: HashMap<EntryKey, LeaderboardEntry>,
}

#[derive(Clone, Default)]
pub struct InMemoryLeaderboardStorage {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryLeaderboardStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct InMemoryLeaderboardTxn {
    inner: Arc<RwLock<Inner>>,
    pending: HashMap<EntryKey, LeaderboardEntry>,
}

impl InMemoryLeaderboardTxn {
    /// Committed rows overlaid with this transaction's writes.
    fn view(&self, mode: LeaderboardMode) -> Vec<LeaderboardEntry> {
        let inner = self.inner.read();
        let mut merged: HashMap<EntryKey, LeaderboardEntry> = inner
            .entries
            .iter()
            .filter(|((_, m), _)| *m == mode)
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        for (key, entry) in &self.pending {
            if key.1 == mode {
                merged.insert(*key, entry.clone());
            }
        }
        merged.into_values().collect()
    }
}

#[async_trait]
impl LeaderboardStorage for InMemoryLeaderboardStorage {
    async fn begin(&self) -> Result<Box<dyn LeaderboardTxn + Send>, LeaderboardError> {
        Ok(Box::new(InMemoryLeaderboardTxn {
            inner: Arc::clone(&self.inner),
            pending: HashMap::new(),
        }))
    }
}

#[async_trait]
impl LeaderboardTxn for InMemoryLeaderboardTxn {
    async fn load_entry(
        &mut self,
        player: PlayerId,
        mode: LeaderboardMode,
    ) -> Result<Option<LeaderboardEntry>, LeaderboardError> {
        if let Some(entry) = self.pending.get(&(player, mode)) {
            return Ok(Some(entry.clone()));
        }
        Ok(self.inner.read().entries.get(&(player, mode)).cloned())
    }

    async fn upsert_entry(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        self.pending.insert((entry.player_id, entry.mode), entry);
        Ok(())
    }

    async fn count_above(
        &mut self,
        mode: LeaderboardMode,
        score: u64,
    ) -> Result<u32, LeaderboardError> {
        Ok(self.view(mode).iter().filter(|e| e.score > score).count() as u32)
    }

    async fn top_entries(
        &mut self,
        mode: LeaderboardMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut rows = self.view(mode);
        rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.updated_at.cmp(&b.updated_at)));
        Ok(rows.into_iter().skip(offset).take(limit).collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), LeaderboardError> {
        let mut inner = self.inner.write();
        for (key, entry) in self.pending {
            inner.entries.insert(key, entry);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) {}
}
