use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Card, CardCatalog, CardFilter, CardKind, CardTypeFilter, DifficultyTier};
use crate::engine::round::{InvariantCheck, StateError};
use crate::scoring::ranked_card_value;

const LOG_TARGET: &str = "crusade::ranked::playlist";

/// (tier, cards) in play order.
pub const RANKED_PHASES: [(u8, usize); 5] = [(1, 6), (2, 5), (3, 4), (4, 3), (5, 2)];
pub const RANKED_RUN_LENGTH: usize = 20;
pub const LIBRARY_SHARE: f64 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum PlaylistError {
    #[error("tier {tier} has {available} eligible cards, ranked needs {needed}")]
    InsufficientCards {
        tier: DifficultyTier,
        needed: usize,
        available: usize,
    },
}

/// (library, crypt) quota for one phase; ties round toward library.
pub fn phase_split(count: usize) -> (usize, usize) {
    let library = ((count as f64 * LIBRARY_SHARE).round() as usize).min(count);
    (library, count - library)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub card: Card,
    pub tier: DifficultyTier,
    pub base_value: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlaylist {
    entries: Vec<PlaylistEntry>,
}

impl RankedPlaylist {
    pub fn build<R: Rng + ?Sized>(
        catalog: &CardCatalog,
        include_imbued: bool,
        rng: &mut R,
    ) -> Result<Self, PlaylistError> {
        let mut entries = Vec::with_capacity(RANKED_RUN_LENGTH);
        for (value, count) in RANKED_PHASES {
            let tier = DifficultyTier::new(value).unwrap_or(DifficultyTier::MAX);
            let filter = CardFilter {
                include_imbued,
                ..CardFilter::new(tier, CardTypeFilter::All)
            };
            let eligible = catalog.matching(&filter);
            let (mut library, mut crypt): (Vec<&Card>, Vec<&Card>) =
                eligible.into_iter().partition(|c| c.kind == CardKind::Library);
            if library.len() + crypt.len() < count {
                return Err(PlaylistError::InsufficientCards {
                    tier,
                    needed: count,
                    available: library.len() + crypt.len(),
                });
            }
            library.shuffle(rng);
            crypt.shuffle(rng);

            let (library_quota, crypt_quota) = phase_split(count);
            let crypt_take = crypt_quota.min(crypt.len());
            let library_take = (count - crypt_take).min(library.len());
            let crypt_take = count - library_take;
            if library_take != library_quota {
                tracing::warn!(
                    target: LOG_TARGET,
                    tier = %tier,
                    library = library_take,
                    crypt = crypt_take,
                    "ranked phase split rebalanced"
                );
            }

            let mut phase: Vec<&Card> = library
                .into_iter()
                .take(library_take)
                .chain(crypt.into_iter().take(crypt_take))
                .collect();
            phase.shuffle(rng);
            entries.extend(phase.into_iter().map(|card| PlaylistEntry {
                card: card.clone(),
                tier,
                base_value: ranked_card_value(tier),
            }));
        }

        tracing::debug!(target: LOG_TARGET, cards = entries.len(), "ranked playlist built");
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[PlaylistEntry] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&PlaylistEntry> {
        self.entries.get(idx)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best possible score ignoring streak multipliers.
    pub fn base_total(&self) -> u32 {
        self.entries.iter().map(|e| e.base_value).sum()
    }
}

impl InvariantCheck for RankedPlaylist {
    fn validate_invariants(&self) -> Result<(), StateError> {
        if self.entries.len() != RANKED_RUN_LENGTH {
            return Err(StateError::InvariantViolation("ranked playlist length"));
        }
        if self.entries.windows(2).any(|w| w[0].tier > w[1].tier) {
            return Err(StateError::InvariantViolation("ranked tiers out of order"));
        }
        for (value, count) in RANKED_PHASES {
            let in_tier = self.entries.iter().filter(|e| e.tier.value() == value).count();
            if in_tier != count {
                return Err(StateError::InvariantViolation("ranked phase size"));
            }
        }
        if self.entries.iter().any(|e| e.card.difficulty != e.tier) {
            return Err(StateError::InvariantViolation("card tier mismatch"));
        }
        let mut ids: Vec<_> = self.entries.iter().map(|e| e.card.id).collect();
        ids.sort();
        ids.dedup();
        if ids.len() != self.entries.len() {
            return Err(StateError::InvariantViolation("duplicate ranked card"));
        }
        Ok(())
    }
}
