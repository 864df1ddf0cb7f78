use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::LeaderboardError;
use super::storage::{
    InMemoryLeaderboardStorage, LeaderboardStorage, SupabaseConfig, SupabaseLeaderboardStorage,
};
use super::types::{
    AuthenticatedPlayer, LeaderboardEntry, LeaderboardMode, PlayerId, RankedEntry,
    ScoreSubmission, SubmissionOutcome,
};
use super::validation::{validate_page, validate_submission};

const LOG_TARGET: &str = "crusade::leaderboard";

#[async_trait]
pub trait LeaderboardGateway: Send + Sync {
    /// Records a finished run and returns the player's standing afterwards.
    async fn submit(
        &self,
        player: &AuthenticatedPlayer,
        submission: ScoreSubmission,
    ) -> Result<SubmissionOutcome, LeaderboardError>;

    async fn top(
        &self,
        mode: LeaderboardMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RankedEntry>, LeaderboardError>;

    async fn rank_of(
        &self,
        player: PlayerId,
        mode: LeaderboardMode,
    ) -> Result<Option<u32>, LeaderboardError>;
}

#[derive(Clone)]
pub struct LeaderboardService {
    storage: Arc<dyn LeaderboardStorage>,
}

impl LeaderboardService {
    pub fn new(storage: Arc<dyn LeaderboardStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        let storage = Arc::new(InMemoryLeaderboardStorage::new()) as Arc<dyn LeaderboardStorage>;
        Self::new(storage)
    }

    pub fn supabase(config: SupabaseConfig) -> Self {
        let storage =
            Arc::new(SupabaseLeaderboardStorage::new(config)) as Arc<dyn LeaderboardStorage>;
        Self::new(storage)
    }
}

/// Merges a submission into the player's stored row.
///
/// Only a strictly higher score replaces the stored best. Every submission
/// counts as a game played, and the best streak never decreases.
pub fn reconcile(
    existing: Option<LeaderboardEntry>,
    player: &AuthenticatedPlayer,
    submission: &ScoreSubmission,
    now: DateTime<Utc>,
) -> (LeaderboardEntry, bool) {
    match existing {
        None => (
            LeaderboardEntry {
                player_id: player.id,
                display_name: player.display_name.clone(),
                mode: submission.mode,
                score: submission.score,
                cards_played: submission.cards_played,
                cards_correct: submission.cards_correct,
                best_streak: submission.best_streak,
                games_played: 1,
                updated_at: now,
            },
            true,
        ),
        Some(mut entry) => {
            let improved = submission.score > entry.score;
            if improved {
                entry.score = submission.score;
                entry.cards_played = submission.cards_played;
                entry.cards_correct = submission.cards_correct;
                entry.updated_at = now;
            }
            entry.best_streak = entry.best_streak.max(submission.best_streak);
            entry.games_played = entry.games_played.saturating_add(1);
            if player.display_name.is_some() {
                entry.display_name = player.display_name.clone();
            }
            (entry, improved)
        }
    }
}

#[async_trait]
impl LeaderboardGateway for LeaderboardService {
    async fn submit(
        &self,
        player: &AuthenticatedPlayer,
        submission: ScoreSubmission,
    ) -> Result<SubmissionOutcome, LeaderboardError> {
        validate_submission(&submission)?;

        let mut txn = self.storage.begin().await?;
        let result: Result<SubmissionOutcome, LeaderboardError> = async {
            let existing = txn.load_entry(player.id, submission.mode).await?;
            let (entry, updated) = reconcile(existing, player, &submission, Utc::now());
            let best_score = entry.score;
            let games_played = entry.games_played;
            txn.upsert_entry(entry).await?;
            let rank = txn.count_above(submission.mode, best_score).await? + 1;
            Ok(SubmissionOutcome {
                updated,
                rank,
                best_score,
                games_played,
            })
        }
        .await;

        match result {
            Ok(outcome) => {
                txn.commit().await?;
                tracing::info!(
                    target: LOG_TARGET,
                    player = %player.id,
                    mode = submission.mode.as_str(),
                    score = submission.score,
                    best = outcome.best_score,
                    rank = outcome.rank,
                    updated = outcome.updated,
                    "score submitted"
                );
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback().await;
                tracing::warn!(target: LOG_TARGET, player = %player.id, error = %err, "score submission failed");
                Err(err)
            }
        }
    }

    async fn top(
        &self,
        mode: LeaderboardMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<RankedEntry>, LeaderboardError> {
        validate_page(limit)?;

        let mut txn = self.storage.begin().await?;
        let result: Result<Vec<RankedEntry>, LeaderboardError> = async {
            let rows = txn.top_entries(mode, limit, offset).await?;
            let mut ranked = Vec::with_capacity(rows.len());
            for entry in rows {
                let rank = txn.count_above(mode, entry.score).await? + 1;
                ranked.push(RankedEntry { rank, entry });
            }
            Ok(ranked)
        }
        .await;

        // read-only
        txn.rollback().await;
        result
    }

    async fn rank_of(
        &self,
        player: PlayerId,
        mode: LeaderboardMode,
    ) -> Result<Option<u32>, LeaderboardError> {
        let mut txn = self.storage.begin().await?;
        let result: Result<Option<u32>, LeaderboardError> = async {
            match txn.load_entry(player, mode).await? {
                Some(entry) => Ok(Some(txn.count_above(mode, entry.score).await? + 1)),
                None => Ok(None),
            }
        }
        .await;

        txn.rollback().await;
        result
    }
}
