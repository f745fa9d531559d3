//! View model handed to the renderer
//!
//! A renderer never reads `SessionState` directly. It takes a
//! `SessionView` after every tick or input and draws from that alone.

use serde::{Deserialize, Serialize};

use crate::Point;
use crate::format_time;
use crate::report::SessionSummary;
use crate::sim::{Feedback, FeedbackKind, GamePhase, PatternChallenge, SessionState, SubPhase};

/// HUD timer colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerUrgency {
    Calm,
    Warning,
    Critical,
}

impl TimerUrgency {
    pub fn from_remaining(secs: u32) -> Self {
        if secs > 180 {
            TimerUrgency::Calm
        } else if secs > 90 {
            TimerUrgency::Warning
        } else {
            TimerUrgency::Critical
        }
    }
}

/// Toast shown after a judgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackView {
    pub message: &'static str,
    pub correct: bool,
    pub points: i64,
}

impl From<Feedback> for FeedbackView {
    fn from(feedback: Feedback) -> Self {
        Self {
            message: feedback.message(),
            correct: feedback.kind == FeedbackKind::Correct,
            points: feedback.points,
        }
    }
}

/// How a recall-phase dot should be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotMark {
    Unselected,
    SelectedCorrect,
    SelectedWrong,
}

/// The challenge on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeView {
    pub prompt: &'static str,
    /// 1-based position shown in the step label
    pub number: usize,
    /// `+` or `-` for pattern arithmetic
    pub operator: Option<char>,
    pub challenge: PatternChallenge,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub phase: GamePhase,
    pub sub_phase: Option<SubPhase>,
    pub level: u32,
    pub level_count: u32,
    pub level_description: String,
    pub score: i64,
    pub max_possible_score: i64,
    /// Score over max, clamped to 0..=1
    pub score_progress: f32,
    pub time_remaining_secs: u32,
    pub time_label: String,
    pub timer_urgency: TimerUrgency,
    /// Share of the game time used, 0..=1
    pub game_progress: f32,
    pub step_label: Option<String>,
    /// Elapsed share of the current memorize or answer window
    pub window_progress: Option<f32>,
    pub dots: Vec<Point>,
    pub highlighted_dot: Option<usize>,
    pub dot_marks: Vec<DotMark>,
    pub challenge: Option<ChallengeView>,
    pub answers_locked: bool,
    pub selections: Vec<usize>,
    pub clicks_remaining: usize,
    pub level_correct: u32,
    pub level_total: u32,
    pub feedback: Option<FeedbackView>,
    /// Present once the game is over
    pub summary: Option<SessionSummary>,
}

impl SessionView {
    pub fn capture(state: &SessionState) -> Self {
        let remaining = state.time_remaining_secs();
        let total = state.settings.total_game_time_secs.max(1);
        let game_progress = (total.saturating_sub(remaining)) as f32 / total as f32;
        let score_progress = if state.max_possible_score > 0 {
            (state.score as f32 / state.max_possible_score as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let step = state.sequence_index + 1;
        // Blinks may outnumber challenges; the last challenge repeats
        let challenge_number = step.min(state.challenges.len());
        let (step_label, window_progress) = match state.phase {
            GamePhase::Interleaved(SubPhase::Memorize) => (
                Some(format!(
                    "Blink {}/{} - Watch and Remember",
                    step,
                    state.blink_set.len()
                )),
                Some(state.clock.memorize.progress()),
            ),
            GamePhase::Interleaved(SubPhase::Answer) => (
                Some(format!(
                    "Pattern {}/{} - Analyze the Pattern",
                    challenge_number,
                    state.challenges.len()
                )),
                Some(state.clock.answer.progress()),
            ),
            GamePhase::Recall => (
                Some("Recall Phase - Click the dots that blinked".to_string()),
                None,
            ),
            _ => (None, None),
        };

        let challenge = match state.phase {
            GamePhase::Interleaved(SubPhase::Answer) => {
                state.active_challenge().map(|challenge| ChallengeView {
                    prompt: challenge.kind.prompt(),
                    number: challenge_number,
                    operator: challenge.completion.as_ref().map(|c| c.operation.symbol()),
                    challenge: challenge.clone(),
                })
            }
            _ => None,
        };

        let dot_marks = (0..state.dots.len())
            .map(|dot| {
                if !state.selections.contains(&dot) {
                    DotMark::Unselected
                } else if state.blink_set.contains(dot) {
                    DotMark::SelectedCorrect
                } else {
                    DotMark::SelectedWrong
                }
            })
            .collect();

        let summary =
            (state.phase == GamePhase::Complete).then(|| SessionSummary::from_state(state));

        Self {
            phase: state.phase,
            sub_phase: state.phase.sub_phase(),
            level: state.level,
            level_count: state.settings.level_count(),
            level_description: state.level_config().description.to_string(),
            score: state.score,
            max_possible_score: state.max_possible_score,
            score_progress,
            time_remaining_secs: remaining,
            time_label: format_time(remaining),
            timer_urgency: TimerUrgency::from_remaining(remaining),
            game_progress,
            step_label,
            window_progress,
            dots: state.dots.points.clone(),
            highlighted_dot: state.highlighted_dot(),
            dot_marks,
            challenge,
            answers_locked: !state.accepts_answer(),
            selections: state.selections.clone(),
            clicks_remaining: state.clicks_remaining,
            level_correct: state.level_correct,
            level_total: state.level_total,
            feedback: state.feedback.map(FeedbackView::from),
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{TickInput, advance, click_dot, start_game, start_level, submit_answer, tick};
    use crate::tuning::{DEFAULT_LEVELS, LevelConfig};

    #[test]
    fn test_timer_urgency_bands() {
        assert_eq!(TimerUrgency::from_remaining(240), TimerUrgency::Calm);
        assert_eq!(TimerUrgency::from_remaining(181), TimerUrgency::Calm);
        assert_eq!(TimerUrgency::from_remaining(180), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_remaining(91), TimerUrgency::Warning);
        assert_eq!(TimerUrgency::from_remaining(90), TimerUrgency::Critical);
    }

    #[test]
    fn test_start_view() {
        let state = SessionState::with_defaults(1);
        let view = SessionView::capture(&state);
        assert_eq!(view.phase, GamePhase::Start);
        assert_eq!(view.time_label, "4:00");
        assert_eq!(view.game_progress, 0.0);
        assert_eq!(view.level_description, "Basic Rotation");
        assert!(view.step_label.is_none());
        assert!(view.summary.is_none());
        assert!(view.answers_locked);
    }

    #[test]
    fn test_memorize_then_answer_view() {
        let mut state = SessionState::with_defaults(2);
        start_game(&mut state);
        let view = SessionView::capture(&state);
        assert_eq!(view.sub_phase, Some(SubPhase::Memorize));
        assert_eq!(view.highlighted_dot, state.blink_set.get(0));
        assert_eq!(
            view.step_label.as_deref(),
            Some("Blink 1/3 - Watch and Remember")
        );
        assert!(view.challenge.is_none());

        advance(&mut state, 3000);
        let view = SessionView::capture(&state);
        assert_eq!(view.sub_phase, Some(SubPhase::Answer));
        assert!(view.highlighted_dot.is_none());
        assert!(!view.answers_locked);
        let challenge = view.challenge.expect("challenge on screen");
        assert_eq!(
            challenge.prompt,
            "Are these patterns rotated but identical?"
        );
        assert_eq!(challenge.number, 1);
        assert_eq!(challenge.operator, None);
        assert_eq!(view.window_progress, Some(0.0));

        let truth = challenge.challenge.correct_answer;
        submit_answer(&mut state, !truth);
        let view = SessionView::capture(&state);
        assert!(view.answers_locked);
        let feedback = view.feedback.expect("feedback toast");
        assert_eq!(feedback.message, "Incorrect!");
        assert!(!feedback.correct);
        assert_eq!(view.score_progress, 0.0);
    }

    #[test]
    fn test_challenge_number_follows_label_when_blinks_outnumber_challenges() {
        let mut settings = Settings::default();
        settings.levels[3] = LevelConfig {
            dots: 3,
            pattern_checks: 1,
            ..DEFAULT_LEVELS[3].clone()
        };
        let mut state = SessionState::new(4, settings);
        start_game(&mut state);
        start_level(&mut state, 4);

        for step in 0..3 {
            while !state.accepts_answer() {
                advance(&mut state, 100);
            }
            assert_eq!(state.sequence_index, step);
            let view = SessionView::capture(&state);
            assert_eq!(
                view.step_label.as_deref(),
                Some("Pattern 1/1 - Analyze the Pattern")
            );
            let challenge = view.challenge.expect("challenge on screen");
            assert_eq!(challenge.number, 1);
            // Level 4 content is pattern arithmetic
            assert!(matches!(challenge.operator, Some('+') | Some('-')));
            submit_answer(&mut state, challenge.challenge.correct_answer);
            advance(&mut state, 1000);
        }
        assert_eq!(state.phase, GamePhase::Recall);
    }

    #[test]
    fn test_recall_marks_and_summary() {
        let mut state = SessionState::with_defaults(3);
        let idle = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        while state.phase != GamePhase::Recall {
            tick(&mut state, &idle, 50);
        }

        let wrong = (0..state.dots.len())
            .find(|d| !state.blink_set.contains(*d))
            .unwrap();
        let right = state.blink_set.get(0).unwrap();
        click_dot(&mut state, wrong);
        click_dot(&mut state, right);

        let view = SessionView::capture(&state);
        assert_eq!(view.dot_marks[wrong], DotMark::SelectedWrong);
        assert_eq!(view.dot_marks[right], DotMark::SelectedCorrect);
        assert_eq!(view.clicks_remaining, 1);
        assert_eq!(
            view.step_label.as_deref(),
            Some("Recall Phase - Click the dots that blinked")
        );

        while state.phase != GamePhase::Complete {
            tick(&mut state, &idle, 50);
        }
        let view = SessionView::capture(&state);
        let summary = view.summary.as_ref().expect("summary once complete");
        assert_eq!(summary.levels_completed, 6);
        assert!(view.game_progress > 0.0);
        assert!(serde_json::to_string(&view).is_ok());
    }
}
