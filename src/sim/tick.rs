//! Session transitions and fixed timestep advance
//!
//! Player input is applied first, then time moves forward and due timers
//! fire one at a time. Each input or timer is applied in full before the
//! next one is looked at.

use super::clock::TimerOwner;
use super::dots::{choose_blink_set, generate_dot_field};
use super::patterns::generate_level_challenges;
use super::scoring::points;
use super::state::{Feedback, FeedbackKind, GamePhase, LevelStats, SessionState, SubPhase};

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Start button
    pub start: bool,
    /// Yes/no answer to the active challenge
    pub answer: Option<bool>,
    /// Dot clicked during recall
    pub click_dot: Option<usize>,
    /// Throw the session away and start over
    pub restart: bool,
    /// Idle/demo mode - a perfect player drives the session
    pub idle_mode: bool,
}

/// Apply `input`, then advance the session by `dt_ms`
pub fn tick(state: &mut SessionState, input: &TickInput, dt_ms: u64) {
    if input.restart {
        restart(state);
        return;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autoplay(state, &mut input);
    }

    if input.start {
        start_game(state);
    }
    if let Some(answer) = input.answer {
        submit_answer(state, answer);
    }
    if let Some(dot) = input.click_dot {
        click_dot(state, dot);
    }

    advance(state, dt_ms);
}

/// Fill in what a perfect player would do right now
fn autoplay(state: &SessionState, input: &mut TickInput) {
    match state.phase {
        GamePhase::Start => input.start = true,
        GamePhase::Interleaved(SubPhase::Answer) if state.accepts_answer() => {
            input.answer = state.active_challenge().map(|c| c.correct_answer);
        }
        GamePhase::Recall if state.clicks_remaining > 0 => {
            input.click_dot = state
                .blink_set
                .as_slice()
                .iter()
                .copied()
                .find(|dot| !state.selections.contains(dot));
        }
        _ => {}
    }
}

/// Move session time forward, firing every timer that comes due
pub fn advance(state: &mut SessionState, dt_ms: u64) {
    let until = state.clock.now_ms().saturating_add(dt_ms);
    while let Some(fired) = state.clock.scheduler.pop_due(until) {
        on_timer(state, fired.owner);
    }
    state.clock.scheduler.settle(until);
}

fn on_timer(state: &mut SessionState, owner: TimerOwner) {
    match owner {
        TimerOwner::Global => {
            if state.phase.is_timed() && state.clock.global.tick() {
                log::info!("Time up at level {} (score {})", state.level, state.score);
                finish_game(state);
            }
        }
        TimerOwner::Memorize => {
            if state.clock.memorize.tick() {
                begin_answer(state);
            }
        }
        TimerOwner::Answer => {
            if state.clock.answer.tick() {
                state.clock.answer.restart();
                resolve_answer(state, false, true);
            }
        }
        TimerOwner::Feedback => finish_feedback(state),
        TimerOwner::RecallComplete => complete_level(state),
    }
}

/// Leave the start screen and begin level 1
pub fn start_game(state: &mut SessionState) {
    if state.phase != GamePhase::Start {
        log::debug!("Start ignored in phase {}", state.phase.as_str());
        return;
    }

    log::info!(
        "Starting game (seed {}, {} levels, {}s)",
        state.seed,
        state.settings.level_count(),
        state.settings.total_game_time_secs
    );
    state.score = 0;
    state.level_stats.clear();
    let total = state.settings.total_game_time_secs;
    state.clock.start_global(total);
    start_level(state, 1);
}

/// Generate a level's content and enter its first memorize step
pub fn start_level(state: &mut SessionState, level: u32) {
    state.level = level;
    let config = state.level_config().clone();

    state.clock.cancel_level_timers();
    state.level_start_ms = state.clock.now_ms();
    state.level_correct = 0;
    state.level_total = 0;

    state.dots = generate_dot_field(&mut state.rng);
    state.blink_set = choose_blink_set(&mut state.rng, config.dots);
    state.challenges = generate_level_challenges(&mut state.rng, level, config.pattern_checks);

    state.sequence_index = 0;
    state.selections.clear();
    state.clicks_remaining = state.blink_set.len();
    state.feedback = None;

    log::info!(
        "Level {} ({}): {} dots, {} challenges",
        level,
        config.description,
        state.blink_set.len(),
        state.challenges.len()
    );

    begin_memorize(state);
}

fn begin_memorize(state: &mut SessionState) {
    let duration = u64::from(state.level_config().blink_duration_ms);
    state.phase = GamePhase::Interleaved(SubPhase::Memorize);
    state.clock.start_memorize(duration);
}

fn begin_answer(state: &mut SessionState) {
    let duration = u64::from(state.level_config().pattern_time_ms);
    state.phase = GamePhase::Interleaved(SubPhase::Answer);
    state.clock.start_answer(duration);
}

/// Player answer to the active challenge
pub fn submit_answer(state: &mut SessionState, answer: bool) {
    resolve_answer(state, answer, false);
}

fn resolve_answer(state: &mut SessionState, answer: bool, timed_out: bool) {
    if !state.accepts_answer() {
        log::debug!(
            "Answer ignored in phase {} (feedback open: {})",
            state.phase.as_str(),
            state.feedback.is_some()
        );
        return;
    }
    let Some(challenge) = state.active_challenge() else {
        return;
    };

    let correct = !timed_out && answer == challenge.correct_answer;
    let delta = points(state.level, correct);
    state.score += delta;
    state.level_total += 1;
    if correct {
        state.level_correct += 1;
    }

    log::debug!(
        "Challenge {}: answered {} ({}), {:+} points",
        state.sequence_index + 1,
        answer,
        if timed_out {
            "timeout"
        } else if correct {
            "correct"
        } else {
            "wrong"
        },
        delta
    );

    state.feedback = Some(Feedback {
        kind: if correct {
            FeedbackKind::Correct
        } else {
            FeedbackKind::Incorrect
        },
        timed_out,
        points: delta,
    });

    // The answer countdown must not keep running under the feedback toast
    state.clock.scheduler.cancel_owner(TimerOwner::Answer);
    let delay = state.settings.feedback_delay_ms;
    state
        .clock
        .scheduler
        .schedule_once(TimerOwner::Feedback, delay);
}

fn finish_feedback(state: &mut SessionState) {
    state.feedback = None;
    let next = state.sequence_index + 1;
    if next < state.blink_set.len() {
        state.sequence_index = next;
        begin_memorize(state);
    } else {
        enter_recall(state);
    }
}

fn enter_recall(state: &mut SessionState) {
    state.clock.cancel_level_timers();
    state.phase = GamePhase::Recall;
    state.selections.clear();
    state.clicks_remaining = state.blink_set.len();
    log::debug!(
        "Level {}: recall {} dots",
        state.level,
        state.clicks_remaining
    );
}

/// Player click on a dot during recall
pub fn click_dot(state: &mut SessionState, dot: usize) {
    if state.phase != GamePhase::Recall || state.clicks_remaining == 0 {
        log::debug!(
            "Click on dot {dot} ignored in phase {}",
            state.phase.as_str()
        );
        return;
    }
    if dot >= state.dots.len() {
        log::debug!("Click on dot {dot} ignored: out of range");
        return;
    }
    if state.selections.contains(&dot) {
        return;
    }

    let correct = state.blink_set.contains(dot);
    state.score += points(state.level, correct);
    state.selections.push(dot);
    state.clicks_remaining -= 1;

    if state.clicks_remaining == 0 {
        let delay = state.settings.recall_complete_delay_ms;
        state
            .clock
            .scheduler
            .schedule_once(TimerOwner::RecallComplete, delay);
    }
}

/// Record the finished level and move on
pub fn complete_level(state: &mut SessionState) {
    if state.phase != GamePhase::Recall {
        log::debug!("Level completion ignored in phase {}", state.phase.as_str());
        return;
    }
    let time_spent_ms = state.clock.now_ms() - state.level_start_ms;
    let level_score = state.score - state.recorded_score();

    state.level_stats.push(LevelStats {
        level: state.level,
        correct_answers: state.level_correct,
        total_answers: state.level_total,
        time_spent_ms,
        score: level_score,
    });

    log::info!(
        "Level {} complete: {}/{} correct, {:+} points in {:.1}s",
        state.level,
        state.level_correct,
        state.level_total,
        level_score,
        time_spent_ms as f64 / 1000.0
    );

    if state.level >= state.settings.level_count() {
        finish_game(state);
    } else {
        let next = state.level + 1;
        start_level(state, next);
    }
}

fn finish_game(state: &mut SessionState) {
    state.clock.stop_all();
    state.phase = GamePhase::Complete;
    state.feedback = None;
    let summary = crate::report::SessionSummary::from_state(state);
    log::info!(
        "Game complete: score {}, {} levels, grade {}",
        summary.final_score,
        summary.levels_completed,
        summary.grade.as_str()
    );
}

/// Discard the session and start over from the start screen
pub fn restart(state: &mut SessionState) {
    let seed = state.next_seed();
    let settings = state.settings.clone();
    *state = SessionState::new(seed, settings);
    log::info!("Session restarted with seed {seed}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::settings::Settings;
    use crate::sim::scoring::level_max_points;
    use crate::tuning::LevelConfig;

    fn started(seed: u64) -> SessionState {
        let mut state = SessionState::with_defaults(seed);
        start_game(&mut state);
        state
    }

    /// Advance until the answer window opens
    fn to_answer(state: &mut SessionState) {
        for _ in 0..100 {
            if state.accepts_answer() {
                return;
            }
            advance(state, 100);
        }
        panic!("answer window never opened");
    }

    #[test]
    fn test_start_game_enters_level_one() {
        let state = started(1);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Memorize));
        assert_eq!(state.level, 1);
        assert_eq!(state.dots.len(), crate::consts::TOTAL_DOTS);
        assert_eq!(state.blink_set.len(), 3);
        assert_eq!(state.challenges.len(), 3);
        assert_eq!(state.clicks_remaining, 3);
        assert_eq!(state.highlighted_dot(), state.blink_set.get(0));
    }

    #[test]
    fn test_memorize_window_length() {
        // Level 1 blinks for 2500 ms: the third one-second tick ends it
        let mut state = started(2);
        advance(&mut state, 2999);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Memorize));
        advance(&mut state, 1);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Answer));
        assert_eq!(state.clock.answer.remaining_ms(), 7000);
        assert!(state.highlighted_dot().is_none());
    }

    #[test]
    fn test_answer_scores_and_locks() {
        let mut state = started(3);
        to_answer(&mut state);
        let truth = state.active_challenge().unwrap().correct_answer;

        submit_answer(&mut state, truth);
        assert_eq!(state.score, 3);
        assert_eq!((state.level_correct, state.level_total), (1, 1));
        assert_eq!(state.feedback.map(|f| f.kind), Some(FeedbackKind::Correct));

        // Locked during the grace window
        submit_answer(&mut state, !truth);
        assert_eq!(state.score, 3);
        assert_eq!(state.level_total, 1);

        advance(&mut state, 1000);
        assert!(state.feedback.is_none());
        assert_eq!(state.sequence_index, 1);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Memorize));
    }

    #[test]
    fn test_wrong_answer_penalty() {
        let mut state = started(4);
        to_answer(&mut state);
        let truth = state.active_challenge().unwrap().correct_answer;
        submit_answer(&mut state, !truth);
        assert_eq!(state.score, -1);
        assert_eq!((state.level_correct, state.level_total), (0, 1));
    }

    #[test]
    fn test_answer_outside_window_ignored() {
        let mut state = started(5);
        submit_answer(&mut state, true);
        assert_eq!(state.score, 0);
        assert_eq!(state.level_total, 0);
    }

    #[test]
    fn test_answer_timeout() {
        let mut state = started(6);
        to_answer(&mut state);
        let before = state.score;

        // Level 1 answer window is 7000 ms
        advance(&mut state, 6999);
        assert!(state.feedback.is_none());
        advance(&mut state, 1);

        let feedback = state.feedback.expect("timeout feedback");
        assert!(feedback.timed_out);
        assert_eq!(feedback.kind, FeedbackKind::Incorrect);
        assert_eq!(feedback.message(), "Time Out!");
        assert_eq!(state.score, before + points(1, false));
        assert_eq!(state.level_total, 1);
        assert_eq!(state.level_correct, 0);
        // Timeout alone does not advance the sequence
        assert_eq!(state.sequence_index, 0);
        assert_eq!(state.clock.answer.remaining_ms(), 7000);
    }

    #[test]
    fn test_no_stale_timeout_after_answer() {
        let mut state = started(7);
        to_answer(&mut state);
        advance(&mut state, 6500);
        let truth = state.active_challenge().unwrap().correct_answer;
        submit_answer(&mut state, truth);
        assert!(!state.clock.scheduler.has_pending(TimerOwner::Answer));

        // Would have been the timeout instant
        advance(&mut state, 600);
        assert_eq!(state.level_total, 1);
        assert_eq!(state.score, 3);
    }

    #[test]
    fn test_global_timeout_mid_puzzle() {
        let settings = Settings {
            total_game_time_secs: 5,
            ..Settings::default()
        };
        let mut state = SessionState::new(8, settings);
        start_game(&mut state);
        to_answer(&mut state);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Answer));

        advance(&mut state, 5000);
        assert_eq!(state.phase, GamePhase::Complete);
        assert_eq!(state.time_remaining_secs(), 0);
        assert_eq!(state.clock.scheduler.pending_count(), 0);

        // Nothing moves after the end
        let score = state.score;
        advance(&mut state, 60_000);
        submit_answer(&mut state, true);
        assert_eq!(state.score, score);
        assert_eq!(state.phase, GamePhase::Complete);
    }

    #[test]
    fn test_global_countdown_runs_once_per_second() {
        let mut state = started(9);
        advance(&mut state, 10_000);
        assert_eq!(state.time_remaining_secs(), 230);
    }

    #[test]
    fn test_start_phase_clock_is_idle() {
        let mut state = SessionState::with_defaults(10);
        advance(&mut state, 100_000);
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.time_remaining_secs(), 240);
    }

    #[test]
    fn test_longest_grace_delay_and_huge_steps() {
        let settings = Settings {
            feedback_delay_ms: crate::consts::MAX_GRACE_DELAY_MS,
            ..Settings::default()
        };
        let mut state = SessionState::new(12, settings);
        start_game(&mut state);
        to_answer(&mut state);
        submit_answer(&mut state, true);
        assert!(state.feedback.is_some());
        advance(&mut state, crate::consts::MAX_GRACE_DELAY_MS - 1);
        assert!(state.feedback.is_some());

        // Time runs out long before the step ends; nothing overflows
        advance(&mut state, u64::MAX);
        assert_eq!(state.phase, GamePhase::Complete);
        assert_eq!(state.time_remaining_secs(), 0);
        advance(&mut state, u64::MAX);
        assert_eq!(state.clock.now_ms(), u64::MAX);
    }

    /// Play the interleaved steps of the current level with perfect answers
    fn play_interleaved(state: &mut SessionState) {
        while state.phase != GamePhase::Recall {
            to_answer(state);
            let truth = state.active_challenge().unwrap().correct_answer;
            submit_answer(state, truth);
            advance(state, 1000);
        }
    }

    #[test]
    fn test_recall_duplicate_click_ignored() {
        let mut state = started(11);
        play_interleaved(&mut state);
        assert_eq!(state.phase, GamePhase::Recall);

        let dot = state.blink_set.get(0).unwrap();
        click_dot(&mut state, dot);
        let score = state.score;
        let selected = state.selections.len();

        click_dot(&mut state, dot);
        assert_eq!(state.selections.len(), selected);
        assert_eq!(state.score, score);
        assert_eq!(state.clicks_remaining, 2);
    }

    #[test]
    fn test_recall_scoring_and_completion() {
        let mut state = started(12);
        play_interleaved(&mut state);
        let after_puzzles = state.score;

        let wrong = (0..state.dots.len())
            .find(|d| !state.blink_set.contains(*d))
            .unwrap();
        click_dot(&mut state, wrong);
        assert_eq!(state.score, after_puzzles - 1);

        click_dot(&mut state, 999);
        assert_eq!(state.selections.len(), 1);

        let right: Vec<usize> = state.blink_set.as_slice()[..2].to_vec();
        for dot in right {
            click_dot(&mut state, dot);
        }
        assert_eq!(state.clicks_remaining, 0);
        assert_eq!(state.score, after_puzzles - 1 + 6);

        // Extra clicks after the budget is spent do nothing
        let extra = state.blink_set.get(2).unwrap();
        click_dot(&mut state, extra);
        assert_eq!(state.selections.len(), 3);

        advance(&mut state, 499);
        assert_eq!(state.phase, GamePhase::Recall);
        advance(&mut state, 1);
        assert_eq!(state.level, 2);
        assert_eq!(state.level_stats.len(), 1);
        assert_eq!(state.level_stats[0].score, state.score);
        assert_eq!(state.level_stats[0].correct_answers, 3);
        assert_eq!(state.phase, GamePhase::Interleaved(SubPhase::Memorize));
    }

    fn run_autoplay(state: &mut SessionState) {
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..20_000 {
            if state.phase == GamePhase::Complete {
                return;
            }
            tick(state, &input, SIM_DT_MS);
        }
        panic!("autoplay did not finish");
    }

    #[test]
    fn test_perfect_run_all_levels() {
        let mut state = SessionState::with_defaults(2025);
        run_autoplay(&mut state);

        assert_eq!(state.phase, GamePhase::Complete);
        assert_eq!(state.level_stats.len(), 6);

        let expected: i64 = state
            .settings
            .levels
            .iter()
            .zip(1u32..)
            .map(|(config, level)| level_max_points(level, config))
            .sum();
        assert_eq!(state.score, expected);
        assert_eq!(state.recorded_score(), state.score);

        for (stats, level) in state.level_stats.iter().zip(1u32..) {
            assert_eq!(stats.level, level);
            assert_eq!(stats.correct_answers, stats.total_answers);
            assert!(stats.time_spent_ms > 0);
        }
        assert!(state.time_remaining_secs() > 0);
    }

    #[test]
    fn test_level_stats_grow_one_per_level() {
        let mut state = SessionState::with_defaults(31);
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        let mut seen = 0;
        while state.phase != GamePhase::Complete {
            tick(&mut state, &input, SIM_DT_MS);
            if state.level_stats.len() != seen {
                seen = state.level_stats.len();
                assert_eq!(state.level, (seen as u32 + 1).min(6));
            }
        }
        assert_eq!(seen, 6);
    }

    #[test]
    fn test_challenge_index_clamped_when_blinks_outnumber_challenges() {
        let mut settings = Settings::default();
        settings.levels = vec![LevelConfig {
            dots: 4,
            pattern_checks: 2,
            ..settings.levels[0].clone()
        }];
        let mut state = SessionState::new(13, settings);
        start_game(&mut state);
        assert_eq!(state.challenges.len(), 2);

        play_interleaved(&mut state);
        assert_eq!(state.level_total, 4);
        assert_eq!(state.level_correct, 4);
        assert_eq!(state.sequence_index, 3);
        assert_eq!(
            state.active_challenge().map(|c| c.id.clone()),
            Some(state.challenges[1].id.clone())
        );
    }

    #[test]
    fn test_restart_returns_to_start() {
        let mut state = started(14);
        to_answer(&mut state);
        submit_answer(&mut state, true);

        tick(
            &mut state,
            &TickInput {
                restart: true,
                ..Default::default()
            },
            SIM_DT_MS,
        );
        assert_eq!(state.phase, GamePhase::Start);
        assert_eq!(state.score, 0);
        assert!(state.level_stats.is_empty());
        assert_eq!(state.clock.scheduler.pending_count(), 0);
        assert_ne!(state.seed, 14);
    }

    #[test]
    fn test_determinism() {
        let mut a = SessionState::with_defaults(99999);
        let mut b = SessionState::with_defaults(99999);
        let inputs = [
            TickInput {
                start: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                answer: Some(true),
                ..Default::default()
            },
            TickInput {
                idle_mode: true,
                ..Default::default()
            },
        ];

        for _ in 0..400 {
            for input in &inputs {
                tick(&mut a, input, 100);
                tick(&mut b, input, 100);
            }
        }

        assert_eq!(a.phase, b.phase);
        assert_eq!(a.score, b.score);
        assert_eq!(a.level_stats, b.level_stats);
        assert_eq!(a.dots, b.dots);
        assert_eq!(a.challenges, b.challenges);
    }
}
