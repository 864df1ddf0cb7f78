#![cfg(test)]

use std::sync::Arc;
use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};

use super::*;
use crate::catalog::{CardFilter, CardTypeFilter, DifficultyTier};
use crate::distractors::PremiumDistractorTable;
use crate::ranked::RankedPlaylist;
use crate::test_utils::fixtures::{sample_catalog, sample_premium};

fn tier(value: u8) -> DifficultyTier {
    DifficultyTier::new(value).unwrap()
}

fn casual(filter: CardFilter, seed: u64) -> RoundController {
    RoundController::casual(
        sample_catalog(),
        sample_premium(),
        filter,
        RunStats::default(),
        RoundConfig::default(),
        StdRng::seed_from_u64(seed),
    )
}

fn ranked(seed: u64) -> RoundController {
    let catalog = sample_catalog();
    let mut rng = StdRng::seed_from_u64(seed);
    let playlist = RankedPlaylist::build(&catalog, true, &mut rng).expect("playlist");
    RoundController::ranked(
        catalog,
        Arc::new(PremiumDistractorTable::default()),
        playlist,
        RoundConfig::default(),
        rng,
    )
}

fn correct_label(ctrl: &RoundController) -> String {
    ctrl.current().expect("open round").options.correct().to_string()
}

fn wrong_label(ctrl: &RoundController) -> Option<String> {
    let round = ctrl.current()?;
    round
        .options
        .options()
        .iter()
        .find(|o| !round.options.is_correct(o))
        .cloned()
}

#[test]
fn correct_answer_scores_and_schedules_auto_advance() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 1);
    let presented = ctrl.present_next().expect("present");
    assert!(matches!(presented, Transition::Presented { round_id: 1, .. }));
    assert_eq!(ctrl.phase(), RoundPhase::Presenting);

    let label = correct_label(&ctrl);
    match ctrl.apply_action(PlayerAction::Choose(label)).expect("answer") {
        Transition::Answered {
            outcome,
            points,
            auto_advance,
            ..
        } => {
            assert_eq!(outcome, RoundOutcome::Correct);
            assert_eq!(points, 20);
            assert_eq!(auto_advance, Some(Duration::from_millis(1500)));
        }
        other => panic!("unexpected transition {other:?}"),
    }
    assert_eq!(ctrl.phase(), RoundPhase::Advancing);
    assert_eq!(ctrl.stats().correct, 1);
    assert_eq!(ctrl.stats().streak, 1);
}

#[test]
fn only_first_resolving_action_counts() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 2);
    ctrl.present_next().expect("present");
    let wrong = wrong_label(&ctrl).expect("distractor");
    let right = correct_label(&ctrl);

    let first = ctrl.apply_action(PlayerAction::Choose(wrong)).expect("answer");
    assert!(matches!(
        first,
        Transition::Answered {
            outcome: RoundOutcome::Incorrect,
            auto_advance: None,
            ..
        }
    ));
    assert_eq!(
        ctrl.apply_action(PlayerAction::Choose(right)),
        Ok(Transition::Ignored)
    );
    assert_eq!(ctrl.apply_action(PlayerAction::Skip), Ok(Transition::Ignored));
    assert_eq!(ctrl.stats().played, 1);
    assert_eq!(ctrl.stats().correct, 0);
    assert_eq!(ctrl.phase(), RoundPhase::Answered);
}

#[test]
fn free_text_guess_resolves_round() {
    let mut ctrl = casual(CardFilter::new(tier(4), CardTypeFilter::Crypt), 3);
    ctrl.present_next().expect("present");
    let name = ctrl.current().expect("round").card.display_name().to_uppercase();
    let transition = ctrl.apply_action(PlayerAction::Guess(name)).expect("guess");
    assert!(matches!(
        transition,
        Transition::Answered {
            outcome: RoundOutcome::Correct,
            points: 200,
            ..
        }
    ));
}

#[test]
fn unknown_option_leaves_round_open() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 4);
    ctrl.present_next().expect("present");
    assert_eq!(
        ctrl.apply_action(PlayerAction::Choose("Not A Card".into())),
        Err(ActionError::UnknownOption)
    );
    assert_eq!(ctrl.phase(), RoundPhase::Presenting);
}

#[test]
fn skip_resets_streak_and_waits_for_continue() {
    let mut ctrl = casual(CardFilter::new(tier(2), CardTypeFilter::Library), 5);
    ctrl.present_next().expect("present");
    let label = correct_label(&ctrl);
    ctrl.apply_action(PlayerAction::Choose(label)).expect("answer");
    ctrl.advance().expect("continue");

    let events = match ctrl.apply_action(PlayerAction::Skip).expect("skip") {
        Transition::Answered {
            outcome: RoundOutcome::Skipped,
            points: 0,
            auto_advance: None,
            events,
            ..
        } => events,
        other => panic!("unexpected transition {other:?}"),
    };
    assert!(events.contains(&RoundEvent::StreakReset { previous: 1 }));
    assert_eq!(ctrl.stats().streak, 0);
    assert_eq!(ctrl.stats().best_streak, 1);
    assert_eq!(ctrl.phase(), RoundPhase::Answered);
}

#[test]
fn stale_auto_advance_is_ignored() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 6);
    ctrl.present_next().expect("present");
    let first_id = ctrl.current_round_id().expect("id");
    let label = correct_label(&ctrl);
    ctrl.apply_action(PlayerAction::Choose(label)).expect("answer");

    // player continues before the timer fires
    let next = ctrl.advance().expect("advance");
    let Transition::Presented { round_id, .. } = next else {
        panic!("expected next round");
    };
    assert_ne!(round_id, first_id);

    assert_eq!(ctrl.auto_advance(first_id), Ok(Transition::Ignored));
    assert_eq!(ctrl.current_round_id(), Some(round_id));
    assert_eq!(ctrl.phase(), RoundPhase::Presenting);
}

#[test]
fn auto_advance_presents_next_round() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::All), 7);
    ctrl.present_next().expect("present");
    let id = ctrl.current_round_id().expect("id");
    let label = correct_label(&ctrl);
    ctrl.apply_action(PlayerAction::Choose(label)).expect("answer");
    let transition = ctrl.auto_advance(id).expect("advance");
    assert!(matches!(transition, Transition::Presented { round_id, .. } if round_id == id + 1));
}

#[test]
fn advance_requires_resolved_round() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 8);
    assert_eq!(ctrl.advance(), Err(StateError::InvalidTransition));
    ctrl.present_next().expect("present");
    assert_eq!(ctrl.advance(), Err(StateError::InvalidTransition));
    assert_eq!(ctrl.present_next(), Err(StateError::InvalidTransition));
}

#[test]
fn casual_keeps_lookahead_queue() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 9);
    ctrl.present_next().expect("present");
    let upcoming = ctrl.upcoming();
    assert_eq!(upcoming.len(), RoundConfig::default().casual_lookahead);
    assert!(upcoming.iter().all(|c| c.difficulty == tier(1)));
}

#[test]
fn hints_are_charged_once_per_kind() {
    let mut ctrl = casual(CardFilter::new(tier(2), CardTypeFilter::Library), 10);
    ctrl.present_next().expect("present");
    let first = ctrl.request_hint(HintKind::CardType).expect("hint");
    let again = ctrl.request_hint(HintKind::CardType).expect("hint");
    assert_eq!(first, again);
    let initials = ctrl.request_hint(HintKind::Initials).expect("initials");
    assert!(initials.contains('.'));
    assert_eq!(
        ctrl.request_hint(HintKind::Capacity),
        Err(ActionError::HintUnavailable(HintKind::Capacity))
    );

    let round = ctrl.current().expect("round");
    assert_eq!(round.hints.hints_used, 1);
    assert!(round.hints.initials_used);

    let label = correct_label(&ctrl);
    let transition = ctrl.apply_action(PlayerAction::Choose(label)).expect("answer");
    // 50 base, minus 10 for the type hint, minus 25 for initials
    assert!(matches!(transition, Transition::Answered { points: 15, .. }));
}

#[test]
fn crypt_hints_reveal_clan_and_capacity() {
    let mut ctrl = casual(CardFilter::new(tier(4), CardTypeFilter::Crypt), 11);
    ctrl.present_next().expect("present");
    let clan = ctrl.request_hint(HintKind::Discipline).expect("clan");
    assert!(clan.starts_with("Tremere"));
    let capacity: u8 = ctrl.request_hint(HintKind::Capacity).expect("capacity").parse().expect("number");
    assert!(capacity >= 8);
}

#[test]
fn filter_change_abandons_open_round_without_stats() {
    let mut ctrl = casual(CardFilter::new(tier(1), CardTypeFilter::Library), 12);
    ctrl.present_next().expect("present");
    let abandoned = ctrl.current_round_id().expect("id");

    let new_filter = CardFilter::new(tier(4), CardTypeFilter::Crypt);
    let transition = ctrl.set_filter(new_filter).expect("filter change");
    let Transition::Presented { events, .. } = transition else {
        panic!("expected a new round");
    };
    assert_eq!(events[0], RoundEvent::Abandoned { round_id: abandoned });
    assert_eq!(ctrl.stats(), &RunStats::default());
    let card = &ctrl.current().expect("round").card;
    assert!(card.is_crypt());
    assert_eq!(card.difficulty, tier(4));
    assert_eq!(ctrl.auto_advance(abandoned), Ok(Transition::Ignored));
}

#[test]
fn empty_filter_reports_no_candidates() {
    let filter = CardFilter {
        include_imbued: false,
        ..CardFilter::new(tier(5), CardTypeFilter::Crypt)
    };
    let mut ctrl = casual(filter, 13);
    assert_eq!(
        ctrl.present_next(),
        Err(StateError::NoCandidates {
            tier: tier(5),
            kind: CardTypeFilter::Crypt
        })
    );
    assert_eq!(ctrl.phase(), RoundPhase::Selecting);
}

#[test]
fn ranked_rejects_skip_and_hints() {
    let mut ctrl = ranked(14);
    ctrl.present_next().expect("present");
    assert_eq!(
        ctrl.apply_action(PlayerAction::Skip),
        Err(ActionError::SkipNotAllowedInRanked)
    );
    assert_eq!(
        ctrl.request_hint(HintKind::Initials),
        Err(ActionError::HintsNotAllowedInRanked)
    );
    assert_eq!(ctrl.phase(), RoundPhase::Presenting);
    assert_eq!(ctrl.answer_window(), Some(Duration::from_secs(10)));
}

#[test]
fn ranked_timeout_counts_as_miss() {
    let mut ctrl = ranked(15);
    ctrl.present_next().expect("present");
    let label = correct_label(&ctrl);
    ctrl.apply_action(PlayerAction::Choose(label)).expect("answer");
    ctrl.advance().expect("advance");

    let id = ctrl.current_round_id().expect("id");
    assert_eq!(ctrl.expire(id - 1), Transition::Ignored);
    let transition = ctrl.expire(id);
    assert!(matches!(
        transition,
        Transition::Answered {
            outcome: RoundOutcome::TimedOut,
            points: 0,
            auto_advance: None,
            ..
        }
    ));
    assert_eq!(ctrl.stats().streak, 0);
    // a late answer after the timeout does nothing
    assert_eq!(
        ctrl.apply_action(PlayerAction::Guess("anything".into())),
        Ok(Transition::Ignored)
    );
}

#[test]
fn ranked_run_completes_after_twenty_cards() {
    let mut ctrl = ranked(16);
    // 14 correct, longest streak 6
    let pattern: Vec<bool> = [vec![true; 6], vec![false], vec![true; 5], vec![false], vec![true; 3], vec![false; 4]]
        .concat();
    assert_eq!(pattern.len(), 20);

    ctrl.present_next().expect("present");
    let mut last = None;
    for (idx, correct) in pattern.iter().enumerate() {
        let action = if *correct {
            PlayerAction::Choose(correct_label(&ctrl))
        } else {
            PlayerAction::Guess("definitely not a card".into())
        };
        let answered = ctrl.apply_action(action).expect("answer");
        if idx == 5 {
            // sixth consecutive correct answer, first one at x1.1 on a tier 1 card
            assert!(matches!(answered, Transition::Answered { points: 11, .. }));
        }
        last = Some(ctrl.advance().expect("advance"));
        if idx < 19 {
            assert!(matches!(last, Some(Transition::Presented { .. })));
        }
    }

    let Some(Transition::RunComplete { summary, events }) = last else {
        panic!("expected run completion");
    };
    assert_eq!(ctrl.phase(), RoundPhase::RunComplete);
    assert_eq!(summary.cards_played, 20);
    assert_eq!(summary.cards_correct, 14);
    assert_eq!(summary.best_streak, 6);
    assert_eq!(summary.outcomes.len(), 20);
    assert!(matches!(events[0], RoundEvent::RunCompleted { correct: 14, .. }));
    assert_eq!(ctrl.summary(), Some(summary));
    assert_eq!(ctrl.present_next(), Err(StateError::InvalidTransition));
    ctrl.stats().validate_invariants().expect("stats invariants");
}

#[test]
fn run_stats_invariants() {
    let mut stats = RunStats::default();
    stats.record_correct(10);
    stats.record_correct(10);
    stats.record_miss();
    assert_eq!(stats.best_streak, 2);
    assert!((stats.accuracy() - 2.0 / 3.0).abs() < 1e-9);
    stats.validate_invariants().expect("valid");

    let broken = RunStats {
        correct: 3,
        played: 2,
        ..Default::default()
    };
    assert_eq!(
        broken.validate_invariants(),
        Err(StateError::InvariantViolation("correct exceeds played"))
    );
}
