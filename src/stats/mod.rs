//! Local persistence of casual-mode totals.
//!
//! The payload mirrors what the web client kept under `vtes-guess-stats`:
//! score, best streak, cards played and cards correct. A missing or corrupt
//! record loads as zeros.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::engine::round::RunStats;

const LOG_TARGET: &str = "crusade::stats";

pub const STATS_KEY: &str = "vtes-guess-stats";

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("failed to write stats: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode stats: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CasualStats {
    pub score: u64,
    pub best_streak: u32,
    pub total_played: u32,
    pub total_correct: u32,
}

impl From<&RunStats> for CasualStats {
    fn from(stats: &RunStats) -> Self {
        Self {
            score: stats.score,
            best_streak: stats.best_streak,
            total_played: stats.played,
            total_correct: stats.correct,
        }
    }
}

impl From<CasualStats> for RunStats {
    fn from(stats: CasualStats) -> Self {
        Self {
            streak: 0,
            best_streak: stats.best_streak,
            score: stats.score,
            played: stats.total_played,
            correct: stats.total_correct,
        }
    }
}

pub trait StatsStore: Send + Sync {
    /// Never fails: unreadable state is reported and replaced with zeros.
    fn load(&self) -> CasualStats;
    fn save(&self, stats: &CasualStats) -> Result<(), StatsError>;
}

/// JSON file keyed like the browser's local storage entry.
pub struct FileStatsStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct StatsFile {
    #[serde(rename = "vtes-guess-stats")]
    stats: CasualStats,
}

impl FileStatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self) -> CasualStats {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return CasualStats::default(),
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, path = %self.path.display(), error = %err, "stats unreadable, starting from zero");
                return CasualStats::default();
            }
        };
        match serde_json::from_str::<StatsFile>(&raw) {
            Ok(file) => file.stats,
            Err(err) => {
                tracing::warn!(target: LOG_TARGET, path = %self.path.display(), error = %err, "corrupt stats, starting from zero");
                CasualStats::default()
            }
        }
    }

    fn save(&self, stats: &CasualStats) -> Result<(), StatsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&StatsFile { stats: *stats })?;
        // atomic replace
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(target: LOG_TARGET, score = stats.score, played = stats.total_played, "stats saved");
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStatsStore {
    inner: Arc<RwLock<Option<CasualStats>>>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for InMemoryStatsStore {
    fn load(&self) -> CasualStats {
        self.inner.read().unwrap_or_default()
    }

    fn save(&self, stats: &CasualStats) -> Result<(), StatsError> {
        *self.inner.write() = Some(*stats);
        Ok(())
    }
}
