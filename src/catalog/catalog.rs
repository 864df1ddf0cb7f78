use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;

use super::errors::CatalogError;
use super::names::normalize;
use super::types::*;

const LOG_TARGET: &str = "crusade::catalog";

/// Immutable card pool, stratified by kind and difficulty tier.
#[derive(Clone, Debug)]
pub struct CardCatalog {
    crypt: Vec<Card>,
    library: Vec<Card>,
    by_id: HashMap<CardId, (CardKind, usize)>,
    by_name: HashMap<String, (CardKind, usize)>,
    levels: BTreeMap<DifficultyTier, String>,
}

impl CardCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        tracing::info!(
            target: LOG_TARGET,
            path = %path.display(),
            crypt = catalog.crypt.len(),
            library = catalog.library.len(),
            "loaded card dataset"
        );
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let dataset: CardDataset = serde_json::from_str(raw)?;
        Self::from_dataset(dataset)
    }

    pub fn from_dataset(dataset: CardDataset) -> Result<Self, CatalogError> {
        let CardDataset {
            metadata,
            mut crypt,
            mut library,
        } = dataset;
        if crypt.is_empty() && library.is_empty() {
            return Err(CatalogError::Empty);
        }
        for card in &mut crypt {
            card.kind = CardKind::Crypt;
        }
        for card in &mut library {
            card.kind = CardKind::Library;
        }

        let mut by_id = HashMap::with_capacity(crypt.len() + library.len());
        let mut by_name = HashMap::with_capacity(crypt.len() + library.len());
        for (kind, pool) in [(CardKind::Crypt, &crypt), (CardKind::Library, &library)] {
            for (idx, card) in pool.iter().enumerate() {
                if by_id.insert(card.id, (kind, idx)).is_some() {
                    tracing::warn!(target: LOG_TARGET, card_id = %card.id, "duplicate card id in dataset");
                }
                by_name.entry(normalize(&card.name)).or_insert((kind, idx));
            }
        }

        let mut levels = BTreeMap::new();
        for (key, label) in metadata.difficulty_levels {
            match key.parse::<u8>().ok().and_then(|v| DifficultyTier::new(v).ok()) {
                Some(tier) => {
                    levels.insert(tier, label);
                }
                None => {
                    tracing::debug!(target: LOG_TARGET, level = %key, "ignoring difficulty label");
                }
            }
        }

        Ok(Self {
            crypt,
            library,
            by_id,
            by_name,
            levels,
        })
    }

    pub fn crypt(&self) -> &[Card] {
        &self.crypt
    }

    pub fn library(&self) -> &[Card] {
        &self.library
    }

    pub fn pool(&self, kind: CardKind) -> &[Card] {
        match kind {
            CardKind::Crypt => &self.crypt,
            CardKind::Library => &self.library,
        }
    }

    pub fn len(&self) -> usize {
        self.crypt.len() + self.library.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.by_id
            .get(&id)
            .map(|&(kind, idx)| &self.pool(kind)[idx])
    }

    /// Lookup by name, insensitive to case, accents and punctuation.
    pub fn find_by_name(&self, name: &str) -> Option<&Card> {
        self.by_name
            .get(&normalize(name))
            .map(|&(kind, idx)| &self.pool(kind)[idx])
    }

    pub fn level_label(&self, tier: DifficultyTier) -> Option<&str> {
        self.levels.get(&tier).map(String::as_str)
    }

    /// Cards whose stored tier equals `tier` exactly.
    pub fn cards_of_difficulty(&self, tier: DifficultyTier, kind: CardTypeFilter) -> Vec<&Card> {
        self.crypt
            .iter()
            .chain(self.library.iter())
            .filter(|card| card.difficulty == tier && kind.admits(card.kind))
            .collect()
    }

    pub fn matching(&self, filter: &CardFilter) -> Vec<&Card> {
        self.crypt
            .iter()
            .chain(self.library.iter())
            .filter(|card| filter.admits(card))
            .collect()
    }

    /// Uniform draw among the cards admitted by `filter`.
    pub fn pick<R: Rng + ?Sized>(&self, filter: &CardFilter, rng: &mut R) -> Result<&Card, CatalogError> {
        self.matching(filter)
            .choose(rng)
            .copied()
            .ok_or(CatalogError::NoCandidates {
                tier: filter.tier,
                kind: filter.kind,
            })
    }
}
