use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::names::normalize;
use crate::catalog::Card;

const LOG_TARGET: &str = "crusade::distractors::premium";

#[derive(Debug, thiserror::Error)]
pub enum PremiumTableError {
    #[error("failed to read premium distractor table: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed premium distractor table: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Curated wrong answers, keyed by canonical card name.
///
/// Keys are matched after normalization. The table file may also key entries
/// by card id rendered as a string; [`PremiumDistractorTable::for_card`] tries
/// both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PremiumDistractorTable {
    entries: HashMap<String, Vec<String>>,
}

impl PremiumDistractorTable {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PremiumTableError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let table = Self::from_json_str(&raw)?;
        tracing::info!(
            target: LOG_TARGET,
            path = %path.display(),
            entries = table.len(),
            "loaded premium distractor table"
        );
        Ok(table)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PremiumTableError> {
        let raw_entries: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        let mut table = Self::default();
        for (key, names) in raw_entries {
            table.insert(&key, names);
        }
        Ok(table)
    }

    pub fn insert<I, S>(&mut self, key: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .insert(normalize(key), names.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Authored distractor names for `card`, in table order.
    pub fn for_card(&self, card: &Card) -> &[String] {
        self.entries
            .get(&normalize(&card.name))
            .or_else(|| self.entries.get(&card.id.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
