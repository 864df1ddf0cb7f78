use async_trait::async_trait;
use postgrest::Postgrest;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{LeaderboardStorage, LeaderboardTxn};
use crate::leaderboard::error::LeaderboardError;
use crate::leaderboard::types::{LeaderboardEntry, LeaderboardMode, PlayerId};

const LOG_TARGET: &str = "crusade::leaderboard::supabase";

pub const DEFAULT_TABLE: &str = "vtes_guess_leaderboard";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl SupabaseConfig {
    pub fn new(url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            url,
            anon_key: anon_key.into(),
            access_token: None,
            table: default_table(),
        }
    }

    fn rest_endpoint(&self) -> String {
        format!("{}/rest/v1", self.url.as_str().trim_end_matches('/'))
    }
}

/// Leaderboard rows behind Supabase's PostgREST endpoint.
///
/// PostgREST has no client-side transactions: each transaction call runs as
/// its own request, and commit/rollback are no-ops. The upsert is keyed on
/// `(user_id, mode)`.
pub struct SupabaseLeaderboardStorage {
    config: SupabaseConfig,
}

impl SupabaseLeaderboardStorage {
    pub fn new(config: SupabaseConfig) -> Self {
        tracing::info!(target: LOG_TARGET, endpoint = %config.rest_endpoint(), table = %config.table, "using supabase leaderboard");
        Self { config }
    }
}

pub struct SupabaseLeaderboardTxn {
    client: Postgrest,
    table: String,
    access_token: Option<String>,
}

impl SupabaseLeaderboardTxn {
    fn builder(&self) -> postgrest::Builder {
        let builder = self.client.from(&self.table);
        match &self.access_token {
            Some(token) => builder.auth(token),
            None => builder,
        }
    }
}

fn transport(err: impl std::fmt::Display) -> LeaderboardError {
    LeaderboardError::transport(err.to_string())
}

fn ensure_success(status: u16, body: &str) -> Result<(), LeaderboardError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(LeaderboardError::backend(format!("postgrest returned {status}: {body}")))
    }
}

/// Total from a `Content-Range` value such as `0-0/17` or `*/0`.
fn parse_content_range_total(range: Option<&str>) -> Result<u32, LeaderboardError> {
    range
        .and_then(|range| range.rsplit('/').next())
        .and_then(|total| total.parse::<u32>().ok())
        .ok_or_else(|| LeaderboardError::backend("missing row count in content-range"))
}

#[async_trait]
impl LeaderboardStorage for SupabaseLeaderboardStorage {
    async fn begin(&self) -> Result<Box<dyn LeaderboardTxn + Send>, LeaderboardError> {
        let client = Postgrest::new(self.config.rest_endpoint())
            .insert_header("apikey", self.config.anon_key.as_str());
        Ok(Box::new(SupabaseLeaderboardTxn {
            client,
            table: self.config.table.clone(),
            access_token: self.config.access_token.clone(),
        }))
    }
}

#[async_trait]
impl LeaderboardTxn for SupabaseLeaderboardTxn {
    async fn load_entry(
        &mut self,
        player: PlayerId,
        mode: LeaderboardMode,
    ) -> Result<Option<LeaderboardEntry>, LeaderboardError> {
        let response = self
            .builder()
            .select("*")
            .eq("user_id", player.to_string())
            .eq("mode", mode.as_str())
            .limit(1)
            .execute()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        ensure_success(status, &body)?;
        let rows: Vec<LeaderboardEntry> = serde_json::from_str(&body)?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_entry(&mut self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        let body = serde_json::to_string(&entry)?;
        let response = self
            .builder()
            .upsert(body)
            .on_conflict("user_id,mode")
            .execute()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        ensure_success(status, &body)?;
        tracing::debug!(target: LOG_TARGET, player = %entry.player_id, mode = entry.mode.as_str(), score = entry.score, "leaderboard row upserted");
        Ok(())
    }

    async fn count_above(
        &mut self,
        mode: LeaderboardMode,
        score: u64,
    ) -> Result<u32, LeaderboardError> {
        let response = self
            .builder()
            .select("user_id")
            .eq("mode", mode.as_str())
            .gt("score", score.to_string())
            .exact_count()
            .range(0, 0)
            .execute()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let range = response
            .headers()
            .get("content-range")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(transport)?;
        ensure_success(status, &body)?;
        parse_content_range_total(range.as_deref())
    }

    async fn top_entries(
        &mut self,
        mode: LeaderboardMode,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let response = self
            .builder()
            .select("*")
            .eq("mode", mode.as_str())
            .order("score.desc,updated_at.asc")
            .range(offset, offset + limit.saturating_sub(1))
            .execute()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        ensure_success(status, &body)?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn commit(self: Box<Self>) -> Result<(), LeaderboardError> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) {
        tracing::debug!(target: LOG_TARGET, "rollback requested; writes are not transactional");
    }
}
