//! Best-effort card metadata for the reveal screen.
//!
//! Lookups go to the KRCG card API by exact card name. Any failure degrades
//! to [`CardDetails::minimal`], built from the catalog entry alone.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::catalog::Card;

const LOG_TARGET: &str = "crusade::enrichment";

pub const DEFAULT_KRCG_BASE_URL: &str = "https://api.krcg.org/";
pub const CARD_IMAGE_BASE_URL: &str = "https://static.krcg.org/card/";

const KNOWN_SECTS: [&str; 5] = ["Camarilla", "Sabbat", "Anarch", "Independent", "Laibon"];

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("card detail request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("card `{0}` not found")]
    NotFound(String),
    #[error("base url `{0}` cannot carry a path")]
    InvalidBaseUrl(Url),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<String>,
    pub disciplines: Vec<String>,
    pub clan: Option<String>,
    pub sect: Option<String>,
    pub title: Option<String>,
    pub first_set: Option<String>,
    pub capacity: Option<u8>,
    pub pool_cost: Option<String>,
    pub blood_cost: Option<String>,
    pub conviction_cost: Option<String>,
    pub artists: Vec<String>,
    pub flavor_text: Option<String>,
    /// False when built locally after a failed lookup.
    pub complete: bool,
}

impl CardDetails {
    pub fn minimal(card: &Card) -> Self {
        Self {
            name: card.name.clone(),
            image_url: (!card.slug.is_empty()).then(|| format!("{CARD_IMAGE_BASE_URL}{}.jpg", card.slug)),
            types: card.types.clone(),
            disciplines: card.disciplines.clone(),
            clan: card.clan.clone(),
            capacity: card.capacity,
            pool_cost: card.pool_cost.clone(),
            blood_cost: card.blood_cost.clone(),
            conviction_cost: card.conviction_cost.clone(),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait CardDetailLookup: Send + Sync {
    async fn lookup(&self, card_name: &str) -> Result<CardDetails, EnrichmentError>;
}

/// Never fails; a lookup error is logged and replaced by local data.
pub async fn details_or_fallback(lookup: &dyn CardDetailLookup, card: &Card) -> CardDetails {
    match lookup.lookup(&card.name).await {
        Ok(details) => details,
        Err(err) => {
            tracing::warn!(target: LOG_TARGET, card_id = %card.id, error = %err, "card detail lookup failed, using fallback");
            CardDetails::minimal(card)
        }
    }
}

/// Subset of the KRCG card payload used here.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KrcgCard {
    pub name: String,
    pub url: Option<String>,
    pub types: Vec<String>,
    pub disciplines: Vec<String>,
    pub clans: Vec<String>,
    pub card_text: Option<String>,
    pub title: Option<String>,
    pub ordered_sets: Vec<String>,
    pub capacity: Option<u8>,
    pub pool_cost: Option<serde_json::Value>,
    pub blood_cost: Option<serde_json::Value>,
    pub conviction_cost: Option<serde_json::Value>,
    pub artists: Vec<String>,
    pub flavor_text: Option<String>,
}

fn cost_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl From<KrcgCard> for CardDetails {
    fn from(card: KrcgCard) -> Self {
        let sect = card
            .card_text
            .as_deref()
            .and_then(|text| text.split_whitespace().next())
            .map(|word| word.trim_end_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| KNOWN_SECTS.contains(word))
            .map(str::to_string);
        Self {
            name: card.name,
            image_url: card.url,
            types: card.types,
            disciplines: card.disciplines,
            clan: card.clans.into_iter().next(),
            sect,
            title: card.title,
            first_set: card.ordered_sets.into_iter().next(),
            capacity: card.capacity,
            pool_cost: cost_text(card.pool_cost),
            blood_cost: cost_text(card.blood_cost),
            conviction_cost: cost_text(card.conviction_cost),
            artists: card.artists,
            flavor_text: card.flavor_text,
            complete: true,
        }
    }
}

pub struct KrcgClient {
    client: reqwest::Client,
    base_url: Url,
    cache: DashMap<String, CardDetails>,
}

impl KrcgClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            cache: DashMap::new(),
        }
    }

    fn card_url(&self, card_name: &str) -> Result<Url, EnrichmentError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EnrichmentError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("card")
            .push(card_name);
        Ok(url)
    }
}

#[async_trait]
impl CardDetailLookup for KrcgClient {
    async fn lookup(&self, card_name: &str) -> Result<CardDetails, EnrichmentError> {
        if let Some(hit) = self.cache.get(card_name) {
            return Ok(hit.clone());
        }
        let url = self.card_url(card_name)?;
        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(EnrichmentError::NotFound(card_name.to_string()));
        }
        let card: KrcgCard = response.error_for_status()?.json().await?;
        let details = CardDetails::from(card);
        tracing::debug!(target: LOG_TARGET, card = %card_name, "card details fetched");
        self.cache.insert(card_name.to_string(), details.clone());
        Ok(details)
    }
}

/// Lookup that always fails; used offline.
pub struct NoLookup;

#[async_trait]
impl CardDetailLookup for NoLookup {
    async fn lookup(&self, card_name: &str) -> Result<CardDetails, EnrichmentError> {
        Err(EnrichmentError::NotFound(card_name.to_string()))
    }
}
