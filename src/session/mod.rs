//! Async driver around a [`RoundController`].
//!
//! The session owns the controller and is the only thing that mutates it.
//! Timers and card-detail fetches run as spawned tasks that report back
//! through an unbounded channel; callers pull those with [`QuizSession::next_event`]
//! and feed them to [`QuizSession::handle_event`]. Every timer event carries
//! the round it was armed for, so a late one cannot touch a newer round.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog::{Card, CardFilter, CardId};
use crate::engine::round::{
    ActionError, GameMode, HintKind, PlayerAction, RoundController, RoundId, RoundPhase,
    StateError, Transition,
};
use crate::enrichment::{details_or_fallback, CardDetailLookup, CardDetails};
use crate::leaderboard::{
    AuthenticatedPlayer, LeaderboardError, LeaderboardGateway, ScoreSubmission, SubmissionOutcome,
};
use crate::stats::{CasualStats, StatsStore};

mod timer;

use timer::{spawn_task, RoundTimer};

const LOG_TARGET: &str = "crusade::session";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The post-answer pause for `round_id` elapsed.
    AutoAdvance { round_id: RoundId },
    /// The ranked answer window for `round_id` elapsed.
    DeadlineExpired { round_id: RoundId },
    /// Details for `card_id` are now in the cache.
    DetailsReady { card_id: CardId },
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Leaderboard(#[from] LeaderboardError),
    #[error("ranked run is not complete")]
    RunNotComplete,
    #[error("run was already submitted")]
    AlreadySubmitted,
}

pub struct QuizSession {
    controller: RoundController,
    lookup: Arc<dyn CardDetailLookup>,
    details: Arc<DashMap<CardId, CardDetails>>,
    requested: HashSet<CardId>,
    stats_store: Option<Arc<dyn StatsStore>>,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
    advance_timer: RoundTimer,
    deadline_timer: RoundTimer,
    submitted: Option<SubmissionOutcome>,
}

impl QuizSession {
    pub fn new(controller: RoundController, lookup: Arc<dyn CardDetailLookup>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controller,
            lookup,
            details: Arc::new(DashMap::new()),
            requested: HashSet::new(),
            stats_store: None,
            events_tx,
            events_rx,
            advance_timer: RoundTimer::new("auto-advance"),
            deadline_timer: RoundTimer::new("answer-deadline"),
            submitted: None,
        }
    }

    /// Casual totals are written here after every resolved round.
    pub fn with_stats_store(mut self, store: Arc<dyn StatsStore>) -> Self {
        self.stats_store = Some(store);
        self
    }

    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    pub fn mode(&self) -> GameMode {
        self.controller.mode()
    }

    pub fn auto_advance_armed(&self) -> bool {
        self.advance_timer.is_armed()
    }

    pub fn deadline_armed(&self) -> bool {
        self.deadline_timer.is_armed()
    }

    /// True once the ranked run has moved past its last answered round. The
    /// summary is available one step earlier, while that round is still on
    /// screen.
    pub fn is_complete(&self) -> bool {
        self.controller.phase() == RoundPhase::RunComplete
    }

    pub fn start(&mut self) -> Result<Transition, SessionError> {
        let transition = self.controller.present_next()?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn act(&mut self, action: PlayerAction) -> Result<Transition, SessionError> {
        let transition = self.controller.apply_action(action)?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn hint(&mut self, kind: HintKind) -> Result<String, SessionError> {
        Ok(self.controller.request_hint(kind)?)
    }

    /// Moves on without waiting for the auto-advance timer.
    pub fn continue_now(&mut self) -> Result<Transition, SessionError> {
        self.advance_timer.cancel();
        let transition = self.controller.advance()?;
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn set_filter(&mut self, filter: CardFilter) -> Result<Transition, SessionError> {
        self.advance_timer.cancel();
        self.deadline_timer.cancel();
        let transition = self.controller.set_filter(filter)?;
        self.after_transition(&transition);
        Ok(transition)
    }

    /// Waits for the next timer or fetch notification.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.try_recv().ok()
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> Result<Transition, SessionError> {
        let transition = match event {
            SessionEvent::AutoAdvance { round_id } => self.controller.auto_advance(round_id)?,
            SessionEvent::DeadlineExpired { round_id } => self.controller.expire(round_id),
            SessionEvent::DetailsReady { .. } => Transition::Ignored,
        };
        self.after_transition(&transition);
        Ok(transition)
    }

    pub fn cached_details(&self, card_id: CardId) -> Option<CardDetails> {
        self.details.get(&card_id).map(|entry| entry.value().clone())
    }

    /// Details for the open round's card, falling back to local data until
    /// the fetch lands.
    pub fn details_for_current(&self) -> Option<CardDetails> {
        let round = self.controller.current()?;
        Some(
            self.cached_details(round.card.id)
                .unwrap_or_else(|| CardDetails::minimal(&round.card)),
        )
    }

    /// Submits the finished ranked run. On failure the summary stays with the
    /// controller, so the call can simply be repeated.
    pub async fn submit_ranked(
        &mut self,
        gateway: &dyn LeaderboardGateway,
        player: &AuthenticatedPlayer,
    ) -> Result<SubmissionOutcome, SessionError> {
        if self.submitted.is_some() {
            return Err(SessionError::AlreadySubmitted);
        }
        let summary = self
            .controller
            .summary()
            .ok_or(SessionError::RunNotComplete)?;
        let outcome = gateway
            .submit(player, ScoreSubmission::from(&summary))
            .await
            .map_err(|err| {
                tracing::warn!(target: LOG_TARGET, error = %err, retryable = err.is_retryable(), "ranked submission failed");
                err
            })?;
        self.submitted = Some(outcome.clone());
        Ok(outcome)
    }

    /// Submits the running casual totals to the `normal` board.
    pub async fn submit_casual(
        &self,
        gateway: &dyn LeaderboardGateway,
        player: &AuthenticatedPlayer,
    ) -> Result<SubmissionOutcome, SessionError> {
        if self.mode() != GameMode::Casual {
            return Err(SessionError::State(StateError::InvalidTransition));
        }
        let submission = ScoreSubmission::casual(self.controller.stats());
        Ok(gateway.submit(player, submission).await?)
    }

    fn after_transition(&mut self, transition: &Transition) {
        match transition {
            Transition::Presented { round_id, .. } => {
                self.advance_timer.cancel();
                match self.controller.answer_window() {
                    Some(window) => self.deadline_timer.arm(
                        window,
                        self.events_tx.clone(),
                        SessionEvent::DeadlineExpired {
                            round_id: *round_id,
                        },
                    ),
                    None => self.deadline_timer.cancel(),
                }
                self.prefetch();
            }
            Transition::Answered {
                round_id,
                auto_advance,
                ..
            } => {
                self.deadline_timer.cancel();
                if let Some(delay) = auto_advance {
                    self.advance_timer.arm(
                        *delay,
                        self.events_tx.clone(),
                        SessionEvent::AutoAdvance {
                            round_id: *round_id,
                        },
                    );
                }
                self.persist_stats();
            }
            Transition::RunComplete { .. } => {
                self.advance_timer.cancel();
                self.deadline_timer.cancel();
            }
            Transition::Ignored => {}
        }
    }

    fn persist_stats(&self) {
        if self.mode() != GameMode::Casual {
            return;
        }
        let Some(store) = &self.stats_store else {
            return;
        };
        if let Err(err) = store.save(&CasualStats::from(self.controller.stats())) {
            tracing::warn!(target: LOG_TARGET, error = %err, "failed to persist casual stats");
        }
    }

    /// Fetches details for the open card and the queued ones behind it.
    fn prefetch(&mut self) {
        let cards: Vec<Card> = self
            .controller
            .current()
            .map(|round| &round.card)
            .into_iter()
            .chain(self.controller.upcoming())
            .cloned()
            .collect();
        for card in cards {
            self.request_details(card);
        }
    }

    fn request_details(&mut self, card: Card) {
        if self.details.contains_key(&card.id) || !self.requested.insert(card.id) {
            return;
        }
        let lookup = Arc::clone(&self.lookup);
        let cache = Arc::clone(&self.details);
        let events = self.events_tx.clone();
        spawn_task(format!("card-details-{}", card.id), async move {
            let details = details_or_fallback(lookup.as_ref(), &card).await;
            cache.insert(card.id, details);
            let _ = events.send(SessionEvent::DetailsReady { card_id: card.id });
        });
    }
}
