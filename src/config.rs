use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::engine::round::RoundConfig;
use crate::enrichment::DEFAULT_KRCG_BASE_URL;
use crate::leaderboard::SupabaseConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime settings for a quiz process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    pub dataset_path: PathBuf,
    pub premium_path: Option<PathBuf>,
    pub stats_path: PathBuf,
    pub krcg_base_url: String,
    pub supabase_url: Option<Url>,
    pub supabase_anon_key: Option<String>,
    pub supabase_access_token: Option<String>,
    pub auto_advance_delay_ms: u64,
    pub ranked_answer_window_ms: u64,
    /// Options shown per round, the correct one included.
    pub option_count: usize,
    pub casual_lookahead: usize,
    pub include_imbued: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("data/cards-with-difficulty.json"),
            premium_path: None,
            stats_path: PathBuf::from("vtes-guess-stats.json"),
            krcg_base_url: DEFAULT_KRCG_BASE_URL.to_string(),
            supabase_url: None,
            supabase_anon_key: None,
            supabase_access_token: None,
            auto_advance_delay_ms: 1500,
            ranked_answer_window_ms: 10_000,
            option_count: 4,
            casual_lookahead: 5,
            include_imbued: true,
        }
    }
}

impl QuizConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.option_count < 2 {
            return Err(ConfigError::Invalid(
                "option_count must be at least 2".to_string(),
            ));
        }
        if self.ranked_answer_window_ms == 0 {
            return Err(ConfigError::Invalid(
                "ranked_answer_window_ms must be positive".to_string(),
            ));
        }
        self.krcg_url()?;
        if self.supabase_url.is_some() != self.supabase_anon_key.is_some() {
            return Err(ConfigError::Invalid(
                "supabase_url and supabase_anon_key must be set together".to_string(),
            ));
        }
        Ok(())
    }

    pub fn krcg_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.krcg_base_url)
            .map_err(|err| ConfigError::Invalid(format!("krcg_base_url: {err}")))
    }

    pub fn round_config(&self) -> RoundConfig {
        RoundConfig {
            distractor_count: self.option_count.saturating_sub(1),
            casual_lookahead: self.casual_lookahead,
            auto_advance_delay: Duration::from_millis(self.auto_advance_delay_ms),
            ranked_answer_window: Duration::from_millis(self.ranked_answer_window_ms),
        }
    }

    /// Remote leaderboard settings, when both URL and key are configured.
    pub fn supabase(&self) -> Option<SupabaseConfig> {
        let url = self.supabase_url.clone()?;
        let key = self.supabase_anon_key.clone()?;
        let mut config = SupabaseConfig::new(url, key);
        config.access_token = self.supabase_access_token.clone();
        Some(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serde::assert_round_trip_eq;

    #[test]
    fn defaults_match_round_defaults() {
        let config = QuizConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.round_config(), RoundConfig::default());
        assert!(config.supabase().is_none());
    }

    #[test]
    fn partial_json_fills_defaults() -> anyhow::Result<()> {
        let config: QuizConfig =
            serde_json::from_str(r#"{"option_count": 6, "include_imbued": false}"#)?;
        assert_eq!(config.round_config().distractor_count, 5);
        assert!(!config.include_imbued);
        assert_eq!(config.auto_advance_delay_ms, 1500);
        Ok(())
    }

    #[test]
    fn supabase_requires_url_and_key() -> anyhow::Result<()> {
        let mut config = QuizConfig {
            supabase_url: Some(Url::parse("https://project.supabase.co")?),
            ..QuizConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.supabase_anon_key = Some("anon".to_string());
        config.supabase_access_token = Some("jwt".to_string());
        assert!(config.validate().is_ok());
        let supabase = config.supabase().expect("configured");
        assert_eq!(supabase.access_token.as_deref(), Some("jwt"));
        Ok(())
    }

    #[test]
    fn rejects_bad_krcg_url() {
        let config = QuizConfig {
            krcg_base_url: "not a url".to_string(),
            ..QuizConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_single_option() {
        let config = QuizConfig {
            option_count: 1,
            ..QuizConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn round_trips() {
        assert_round_trip_eq(&QuizConfig::default());
    }
}
