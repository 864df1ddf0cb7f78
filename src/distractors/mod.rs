//! Wrong-answer synthesis for the multiple-choice grid.
//!
//! Crypt and library cards use different algorithms (see [`crypt`] and
//! [`library`]); both feed ordered candidate buckets into
//! [`take_from_buckets`], which shuffles within each bucket and keeps the
//! first `want` cards whose displayed names are distinct from each other and
//! from the target. Library names must also not be near-duplicates of each
//! other.

pub mod crypt;
pub mod library;
pub mod predicates;
pub mod premium;

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{normalize, Card, CardCatalog, CardKind};

pub use predicates::{are_clans_related, is_name_too_similar, name_similarity};
pub use premium::{PremiumDistractorTable, PremiumTableError};

const LOG_TARGET: &str = "crusade::distractors";

/// Three wrong answers plus the correct one.
pub const DEFAULT_DISTRACTOR_COUNT: usize = 3;

pub(crate) fn take_from_buckets<'a, R: Rng + ?Sized>(
    target: &Card,
    buckets: Vec<Vec<&'a Card>>,
    want: usize,
    rng: &mut R,
) -> Vec<&'a Card> {
    let mut seen: HashSet<String> = HashSet::from([normalize(&target.display_name())]);
    let mut picked = Vec::with_capacity(want);
    for (idx, mut bucket) in buckets.into_iter().enumerate() {
        if picked.len() >= want {
            break;
        }
        // bucket 0 of the library algorithm keeps its authored order
        if idx > 0 || target.kind == CardKind::Crypt {
            bucket.shuffle(rng);
        }
        for card in bucket {
            if picked.len() >= want {
                break;
            }
            let name = card.display_name();
            if target.kind == CardKind::Library
                && picked
                    .iter()
                    .any(|p: &&Card| is_name_too_similar(&p.display_name(), &name))
            {
                continue;
            }
            if seen.insert(normalize(&name)) {
                picked.push(card);
            }
        }
    }
    picked
}

pub struct DistractorGenerator<'a> {
    catalog: &'a CardCatalog,
    premium: &'a PremiumDistractorTable,
    count: usize,
}

impl<'a> DistractorGenerator<'a> {
    pub fn new(catalog: &'a CardCatalog, premium: &'a PremiumDistractorTable) -> Self {
        Self {
            catalog,
            premium,
            count: DEFAULT_DISTRACTOR_COUNT,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Up to `count` wrong answers; fewer when the pool runs dry.
    pub fn distractors<R: Rng + ?Sized>(&self, target: &Card, rng: &mut R) -> Vec<&'a Card> {
        let picked = match target.kind {
            CardKind::Crypt => crypt::crypt_distractors(target, self.catalog.crypt(), self.count, rng),
            CardKind::Library => library::library_distractors(
                target,
                self.catalog,
                self.premium.for_card(target),
                self.count,
                rng,
            ),
        };
        if picked.len() < self.count {
            tracing::warn!(
                target: LOG_TARGET,
                card_id = %target.id,
                found = picked.len(),
                wanted = self.count,
                "distractor shortfall"
            );
        }
        picked
    }

    pub fn option_set<R: Rng + ?Sized>(&self, target: &Card, rng: &mut R) -> OptionSet {
        let distractors = self
            .distractors(target, rng)
            .into_iter()
            .map(Card::display_name)
            .collect();
        OptionSet::shuffled(target.display_name(), distractors, rng)
    }
}

/// Displayed choices for one round, exactly one of them correct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    options: Vec<String>,
    correct_index: usize,
}

impl OptionSet {
    pub fn shuffled<R: Rng + ?Sized>(correct: String, distractors: Vec<String>, rng: &mut R) -> Self {
        let mut tagged: Vec<(bool, String)> = std::iter::once((true, correct))
            .chain(distractors.into_iter().map(|name| (false, name)))
            .collect();
        tagged.shuffle(rng);
        let correct_index = tagged.iter().position(|(correct, _)| *correct).unwrap_or(0);
        Self {
            options: tagged.into_iter().map(|(_, name)| name).collect(),
            correct_index,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn correct(&self) -> &str {
        &self.options[self.correct_index]
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn is_correct(&self, choice: &str) -> bool {
        normalize(choice) == normalize(self.correct())
    }
}
