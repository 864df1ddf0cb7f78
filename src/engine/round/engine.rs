use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;

use super::actions::*;
use super::errors::*;
use super::events::*;
use super::types::*;
use crate::catalog::{initials_hint, is_correct_guess, Card, CardCatalog, CardFilter, CatalogError};
use crate::distractors::{DistractorGenerator, PremiumDistractorTable};
use crate::ranked::{RankedPlaylist, RankedRunSummary};
use crate::scoring::{ranked_points, score};

const LOG_TARGET: &str = "crusade::engine::round";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Presented {
        round_id: RoundId,
        events: Vec<RoundEvent>,
    },
    Answered {
        round_id: RoundId,
        outcome: RoundOutcome,
        points: u32,
        /// Set only after a correct answer.
        auto_advance: Option<Duration>,
        events: Vec<RoundEvent>,
    },
    RunComplete {
        summary: RankedRunSummary,
        events: Vec<RoundEvent>,
    },
    /// The input arrived after the round resolved or for a replaced round.
    Ignored,
}

#[derive(Clone, Debug)]
enum Deck {
    Casual {
        filter: CardFilter,
        queue: VecDeque<Card>,
    },
    Ranked {
        playlist: RankedPlaylist,
        next: usize,
        outcomes: Vec<RoundOutcome>,
    },
}

/// Drives one quiz run, one round at a time.
///
/// All inputs are synchronous; timers live outside and call back with the
/// [`RoundId`] they were armed for, so a late timer can never act on a newer
/// round.
pub struct RoundController {
    catalog: Arc<CardCatalog>,
    premium: Arc<PremiumDistractorTable>,
    config: RoundConfig,
    rng: StdRng,
    deck: Deck,
    phase: RoundPhase,
    current: Option<Round>,
    stats: RunStats,
    next_round_id: RoundId,
}

impl RoundController {
    pub fn casual(
        catalog: Arc<CardCatalog>,
        premium: Arc<PremiumDistractorTable>,
        filter: CardFilter,
        stats: RunStats,
        config: RoundConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            premium,
            config,
            rng,
            deck: Deck::Casual {
                filter,
                queue: VecDeque::new(),
            },
            phase: RoundPhase::Selecting,
            current: None,
            // the live streak never survives a restart
            stats: RunStats { streak: 0, ..stats },
            next_round_id: 1,
        }
    }

    pub fn ranked(
        catalog: Arc<CardCatalog>,
        premium: Arc<PremiumDistractorTable>,
        playlist: RankedPlaylist,
        config: RoundConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            premium,
            config,
            rng,
            deck: Deck::Ranked {
                playlist,
                next: 0,
                outcomes: Vec::with_capacity(crate::ranked::RANKED_RUN_LENGTH),
            },
            phase: RoundPhase::Selecting,
            current: None,
            stats: RunStats::default(),
            next_round_id: 1,
        }
    }

    pub fn mode(&self) -> GameMode {
        match self.deck {
            Deck::Casual { .. } => GameMode::Casual,
            Deck::Ranked { .. } => GameMode::Ranked,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&Round> {
        self.current.as_ref()
    }

    pub fn current_round_id(&self) -> Option<RoundId> {
        self.current.as_ref().map(|r| r.id)
    }

    pub fn filter(&self) -> Option<&CardFilter> {
        match &self.deck {
            Deck::Casual { filter, .. } => Some(filter),
            Deck::Ranked { .. } => None,
        }
    }

    /// Cards queued after the current one, for detail prefetch.
    pub fn upcoming(&self) -> Vec<&Card> {
        match &self.deck {
            Deck::Casual { queue, .. } => queue.iter().collect(),
            Deck::Ranked { playlist, next, .. } => playlist
                .entries()
                .iter()
                .skip(*next)
                .take(self.config.casual_lookahead)
                .map(|e| &e.card)
                .collect(),
        }
    }

    /// Ranked answer window, when the open round has one.
    pub fn answer_window(&self) -> Option<Duration> {
        match (self.mode(), self.phase) {
            (GameMode::Ranked, RoundPhase::Presenting) => Some(self.config.ranked_answer_window),
            _ => None,
        }
    }

    /// Selecting -> Presenting: draws the next target and builds its options.
    pub fn present_next(&mut self) -> Result<Transition, StateError> {
        if self.phase != RoundPhase::Selecting {
            return Err(StateError::InvalidTransition);
        }

        let (card, position) = match &mut self.deck {
            Deck::Casual { filter, queue } => {
                while queue.len() <= self.config.casual_lookahead {
                    match self.catalog.pick(filter, &mut self.rng) {
                        Ok(card) => queue.push_back(card.clone()),
                        Err(CatalogError::NoCandidates { tier, kind }) => {
                            tracing::warn!(target: LOG_TARGET, tier = %tier, ?kind, "no cards for filter");
                            return Err(StateError::NoCandidates { tier, kind });
                        }
                        Err(_) => return Err(StateError::InvalidTransition),
                    }
                }
                match queue.pop_front() {
                    Some(card) => (card, None),
                    None => return Err(StateError::InvalidTransition),
                }
            }
            Deck::Ranked { playlist, next, .. } => match playlist.get(*next) {
                Some(entry) => {
                    let position = *next;
                    *next += 1;
                    (entry.card.clone(), Some(position))
                }
                None => return Err(StateError::InvalidTransition),
            },
        };

        let options = DistractorGenerator::new(&self.catalog, &self.premium)
            .with_count(self.config.distractor_count)
            .option_set(&card, &mut self.rng);

        let round_id = self.next_round_id;
        self.next_round_id += 1;
        let events = vec![RoundEvent::Presented {
            round_id,
            card_id: card.id,
            tier: card.difficulty,
            options: options.len(),
        }];
        tracing::debug!(target: LOG_TARGET, round_id, card_id = %card.id, "round presented");

        self.current = Some(Round {
            id: round_id,
            card,
            options,
            outcome: RoundOutcome::Pending,
            hints: Default::default(),
            hints_shown: Vec::new(),
            points: 0,
            position,
        });
        self.phase = RoundPhase::Presenting;
        Ok(Transition::Presented { round_id, events })
    }

    /// Resolves the open round. Only the first resolving action counts.
    pub fn apply_action(&mut self, action: PlayerAction) -> Result<Transition, ActionError> {
        let mode = self.mode();
        let round = match self.current.as_ref() {
            Some(round) if self.phase == RoundPhase::Presenting => round,
            Some(_) => return Ok(Transition::Ignored),
            None => return Err(ActionError::NoOpenRound),
        };

        let outcome = match &action {
            PlayerAction::Skip if mode == GameMode::Ranked => {
                return Err(ActionError::SkipNotAllowedInRanked)
            }
            PlayerAction::Skip => RoundOutcome::Skipped,
            PlayerAction::Choose(label) => {
                if !round.options.options().iter().any(|o| o == label) {
                    return Err(ActionError::UnknownOption);
                }
                if round.options.is_correct(label) {
                    RoundOutcome::Correct
                } else {
                    RoundOutcome::Incorrect
                }
            }
            PlayerAction::Guess(text) => {
                if is_correct_guess(text, &round.card.name) {
                    RoundOutcome::Correct
                } else {
                    RoundOutcome::Incorrect
                }
            }
        };
        Ok(self.resolve(outcome))
    }

    /// Ranked answer window expired for `round_id`.
    pub fn expire(&mut self, round_id: RoundId) -> Transition {
        let open = self.phase == RoundPhase::Presenting
            && self.mode() == GameMode::Ranked
            && self.current_round_id() == Some(round_id);
        if !open {
            return Transition::Ignored;
        }
        self.resolve(RoundOutcome::TimedOut)
    }

    fn resolve(&mut self, outcome: RoundOutcome) -> Transition {
        let mode = self.mode();
        let Some(round) = self.current.as_mut() else {
            return Transition::Ignored;
        };

        let previous_streak = self.stats.streak;
        let previous_best = self.stats.best_streak;
        let points = match (outcome, mode) {
            (RoundOutcome::Correct, GameMode::Casual) => {
                score(round.hints, previous_streak + 1, round.card.difficulty)
            }
            (RoundOutcome::Correct, GameMode::Ranked) => {
                ranked_points(round.card.difficulty, previous_streak)
            }
            _ => 0,
        };

        let mut events = vec![RoundEvent::Resolved {
            round_id: round.id,
            card_id: round.card.id,
            outcome,
            points,
        }];
        if outcome.is_correct() {
            self.stats.record_correct(points);
            if self.stats.best_streak > previous_best {
                events.push(RoundEvent::NewBestStreak {
                    streak: self.stats.best_streak,
                });
            }
        } else {
            self.stats.record_miss();
            if previous_streak > 0 {
                events.push(RoundEvent::StreakReset {
                    previous: previous_streak,
                });
            }
        }

        round.outcome = outcome;
        round.points = points;
        let round_id = round.id;
        if let Deck::Ranked { outcomes, .. } = &mut self.deck {
            outcomes.push(outcome);
        }

        let auto_advance = outcome.is_correct().then_some(self.config.auto_advance_delay);
        self.phase = if auto_advance.is_some() {
            RoundPhase::Advancing
        } else {
            RoundPhase::Answered
        };
        tracing::info!(
            target: LOG_TARGET,
            round_id,
            ?outcome,
            points,
            streak = self.stats.streak,
            "round resolved"
        );

        Transition::Answered {
            round_id,
            outcome,
            points,
            auto_advance,
            events,
        }
    }

    /// Casual-only hint for the open round. Each kind is charged once.
    pub fn request_hint(&mut self, kind: HintKind) -> Result<String, ActionError> {
        if self.mode() == GameMode::Ranked {
            return Err(ActionError::HintsNotAllowedInRanked);
        }
        let round = match self.current.as_mut() {
            Some(round) if self.phase == RoundPhase::Presenting => round,
            _ => return Err(ActionError::NoOpenRound),
        };
        let card = &round.card;
        let text = match kind {
            HintKind::CardType if !card.types.is_empty() => card.types.join(" / "),
            HintKind::Discipline if card.is_crypt() => match &card.clan {
                Some(clan) => clan.clone(),
                None => return Err(ActionError::HintUnavailable(kind)),
            },
            HintKind::Discipline if !card.disciplines.is_empty() => card.disciplines.join(" / "),
            HintKind::Discipline => "No discipline".to_string(),
            HintKind::Capacity => match card.capacity {
                Some(capacity) => capacity.to_string(),
                None => return Err(ActionError::HintUnavailable(kind)),
            },
            HintKind::Initials => initials_hint(&card.name),
            HintKind::CardType => return Err(ActionError::HintUnavailable(kind)),
        };

        if !round.hints_shown.contains(&kind) {
            round.hints_shown.push(kind);
            if kind == HintKind::Initials {
                round.hints.initials_used = true;
            } else {
                round.hints.hints_used += 1;
            }
        }
        Ok(text)
    }

    /// Auto-advance timer fired for `round_id`.
    pub fn auto_advance(&mut self, round_id: RoundId) -> Result<Transition, StateError> {
        if self.phase != RoundPhase::Advancing || self.current_round_id() != Some(round_id) {
            tracing::debug!(target: LOG_TARGET, round_id, "stale auto-advance ignored");
            return Ok(Transition::Ignored);
        }
        self.advance()
    }

    /// Explicit continue after a resolved round.
    pub fn advance(&mut self) -> Result<Transition, StateError> {
        if !matches!(self.phase, RoundPhase::Answered | RoundPhase::Advancing) {
            return Err(StateError::InvalidTransition);
        }

        if let Deck::Ranked {
            playlist, next, ..
        } = &self.deck
        {
            if *next >= playlist.len() {
                self.phase = RoundPhase::RunComplete;
                let summary = self.summary().ok_or(StateError::InvalidTransition)?;
                let events = vec![RoundEvent::RunCompleted {
                    score: summary.score,
                    correct: summary.cards_correct,
                    played: summary.cards_played,
                }];
                tracing::info!(
                    target: LOG_TARGET,
                    score = summary.score,
                    correct = summary.cards_correct,
                    best_streak = summary.best_streak,
                    "ranked run complete"
                );
                return Ok(Transition::RunComplete { summary, events });
            }
        }

        self.phase = RoundPhase::Selecting;
        self.present_next()
    }

    /// Changes the casual draw filter, abandoning an unanswered round.
    pub fn set_filter(&mut self, new_filter: CardFilter) -> Result<Transition, StateError> {
        let Deck::Casual { filter, queue } = &mut self.deck else {
            return Err(StateError::InvalidTransition);
        };
        if self.phase == RoundPhase::RunComplete {
            return Err(StateError::InvalidTransition);
        }
        *filter = new_filter;
        queue.clear();

        let abandoned = match &self.current {
            Some(round) if round.outcome == RoundOutcome::Pending => Some(round.id),
            _ => None,
        };
        self.current = None;
        self.phase = RoundPhase::Selecting;

        match self.present_next()? {
            Transition::Presented { round_id, mut events } => {
                if let Some(id) = abandoned {
                    events.insert(0, RoundEvent::Abandoned { round_id: id });
                }
                Ok(Transition::Presented { round_id, events })
            }
            other => Ok(other),
        }
    }

    /// Final ranked tally; available once every playlist card was answered.
    pub fn summary(&self) -> Option<RankedRunSummary> {
        match &self.deck {
            Deck::Ranked {
                playlist, outcomes, ..
            } if outcomes.len() == playlist.len() => Some(RankedRunSummary {
                score: self.stats.score,
                cards_played: self.stats.played,
                cards_correct: self.stats.correct,
                best_streak: self.stats.best_streak,
                outcomes: outcomes.clone(),
            }),
            _ => None,
        }
    }
}
