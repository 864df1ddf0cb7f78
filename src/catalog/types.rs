use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::errors::CatalogError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Crypt,
    #[default]
    Library,
}

/// Which side of the card pool a draw is restricted to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardTypeFilter {
    Crypt,
    #[default]
    Library,
    All,
}

impl CardTypeFilter {
    pub fn admits(self, kind: CardKind) -> bool {
        match self {
            CardTypeFilter::All => true,
            CardTypeFilter::Crypt => kind == CardKind::Crypt,
            CardTypeFilter::Library => kind == CardKind::Library,
        }
    }
}

impl std::str::FromStr for CardTypeFilter {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypt" => Ok(CardTypeFilter::Crypt),
            "library" => Ok(CardTypeFilter::Library),
            "all" => Ok(CardTypeFilter::All),
            other => Err(CatalogError::invalid(format!("unknown card type filter `{other}`"))),
        }
    }
}

/// Popularity bucket, 1 = staple, 5 = obscure or never played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DifficultyTier(u8);

impl DifficultyTier {
    pub const MIN: DifficultyTier = DifficultyTier(1);
    pub const MAX: DifficultyTier = DifficultyTier(5);

    pub fn new(value: u8) -> Result<Self, CatalogError> {
        if (1..=5).contains(&value) {
            Ok(DifficultyTier(value))
        } else {
            Err(CatalogError::InvalidTier(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = DifficultyTier> {
        (1..=5).map(DifficultyTier)
    }
}

impl TryFrom<u8> for DifficultyTier {
    type Error = CatalogError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            // legacy "zero appearances" bucket shares the never-used tier
            6 => Ok(DifficultyTier::MAX),
            v => DifficultyTier::new(v),
        }
    }
}

impl From<DifficultyTier> for u8 {
    fn from(tier: DifficultyTier) -> u8 {
        tier.0
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub disciplines: Vec<String>,
    #[serde(default)]
    pub clan: Option<String>,
    #[serde(default)]
    pub capacity: Option<u8>,
    #[serde(default, deserialize_with = "loose_string")]
    pub group: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub count: u32,
    pub difficulty: DifficultyTier,
    #[serde(default, deserialize_with = "loose_string")]
    pub pool_cost: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub blood_cost: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub conviction_cost: Option<String>,
    /// Set from the dataset array the card was read from.
    #[serde(skip)]
    pub kind: CardKind,
}

impl Card {
    pub fn is_crypt(&self) -> bool {
        self.kind == CardKind::Crypt
    }

    pub fn is_imbued(&self) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case("imbued"))
    }

    /// Hunter-only library cards: conviction cost or the Power type.
    pub fn needs_conviction(&self) -> bool {
        self.conviction_cost.is_some() || self.types.iter().any(|t| t.eq_ignore_ascii_case("power"))
    }

    pub fn has_type(&self, card_type: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(card_type))
    }

    pub fn display_name(&self) -> String {
        super::names::display_name(&self.name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub total_decks_analyzed: u32,
    #[serde(default)]
    pub total_crypt_cards: u32,
    #[serde(default)]
    pub total_library_cards: u32,
    #[serde(default)]
    pub difficulty_levels: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDataset {
    #[serde(default)]
    pub metadata: DatasetMetadata,
    #[serde(default)]
    pub crypt: Vec<Card>,
    #[serde(default)]
    pub library: Vec<Card>,
}

/// Draw restriction applied by the round controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub tier: DifficultyTier,
    pub kind: CardTypeFilter,
    pub include_imbued: bool,
}

impl CardFilter {
    pub fn new(tier: DifficultyTier, kind: CardTypeFilter) -> Self {
        Self {
            tier,
            kind,
            include_imbued: true,
        }
    }

    pub fn admits(&self, card: &Card) -> bool {
        if card.difficulty != self.tier || !self.kind.admits(card.kind) {
            return false;
        }
        if self.include_imbued {
            return true;
        }
        match card.kind {
            CardKind::Crypt => !card.is_imbued(),
            CardKind::Library => !card.needs_conviction(),
        }
    }
}

impl Default for CardFilter {
    fn default() -> Self {
        Self::new(DifficultyTier::MIN, CardTypeFilter::Library)
    }
}

fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
