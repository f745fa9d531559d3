//! Session state and core types
//!
//! Everything a session needs lives in one `SessionState`; every transition
//! in `tick.rs` takes it by `&mut` and leaves it consistent.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::SessionClock;
use super::dots::{BlinkSet, DotField};
use super::patterns::PatternChallenge;
use super::scoring::max_possible_score;
use crate::settings::Settings;
use crate::tuning::{DEFAULT_LEVELS, LevelConfig};

/// Step within a memorize/answer pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubPhase {
    /// One blink-set dot is highlighted
    Memorize,
    /// The paired challenge awaits a yes/no answer
    Answer,
}

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to start
    Start,
    /// Alternating memorize and answer steps
    Interleaved(SubPhase),
    /// Clicking the remembered dots
    Recall,
    /// Between-level screen (never entered by the session engine)
    LevelComplete,
    /// Run ended
    Complete,
}

impl GamePhase {
    /// Whether the whole-game countdown runs in this phase
    pub fn is_timed(&self) -> bool {
        !matches!(
            self,
            GamePhase::Start | GamePhase::Complete | GamePhase::LevelComplete
        )
    }

    pub fn sub_phase(&self) -> Option<SubPhase> {
        match self {
            GamePhase::Interleaved(sub) => Some(*sub),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Start => "start",
            GamePhase::Interleaved(_) => "interleaved",
            GamePhase::Recall => "recall",
            GamePhase::LevelComplete => "level-complete",
            GamePhase::Complete => "complete",
        }
    }
}

/// Summary of one finished level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStats {
    pub level: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// Session-clock milliseconds from level start to completion
    pub time_spent_ms: u64,
    pub score: i64,
}

impl LevelStats {
    /// Judgment accuracy in percent (0 with no answers)
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_answers == 0 {
            0.0
        } else {
            f64::from(self.correct_answers) / f64::from(self.total_answers) * 100.0
        }
    }
}

/// Colour of the feedback toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackKind {
    Correct,
    Incorrect,
}

/// Transient result shown after a judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub timed_out: bool,
    pub points: i64,
}

impl Feedback {
    pub fn message(&self) -> &'static str {
        match (self.kind, self.timed_out) {
            (FeedbackKind::Correct, _) => "Correct!",
            (FeedbackKind::Incorrect, true) => "Time Out!",
            (FeedbackKind::Incorrect, false) => "Incorrect!",
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed this session was created with
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub settings: Settings,
    pub phase: GamePhase,
    /// Current level (1-based)
    pub level: u32,
    /// Global score; may go negative
    pub score: i64,
    /// Progress-bar denominator, fixed at creation
    pub max_possible_score: i64,
    pub clock: SessionClock,
    pub dots: DotField,
    pub blink_set: BlinkSet,
    pub challenges: Vec<PatternChallenge>,
    /// Position in the interleaved sequence
    pub sequence_index: usize,
    /// Dots clicked during recall, in click order
    pub selections: Vec<usize>,
    pub clicks_remaining: usize,
    pub level_correct: u32,
    pub level_total: u32,
    pub level_stats: Vec<LevelStats>,
    /// Session-clock time the current level began
    pub level_start_ms: u64,
    /// Set while the post-answer grace window is open
    pub feedback: Option<Feedback>,
}

impl SessionState {
    /// Fresh session in the start phase
    ///
    /// Settings that fail validation are replaced by the defaults.
    pub fn new(seed: u64, settings: Settings) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                log::warn!("Invalid settings ({e}), falling back to defaults");
                Settings::default()
            }
        };
        let max_possible_score = max_possible_score(&settings.levels);
        let clock = SessionClock::new(settings.total_game_time_secs);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            phase: GamePhase::Start,
            level: 1,
            score: 0,
            max_possible_score,
            clock,
            dots: DotField::default(),
            blink_set: BlinkSet::default(),
            challenges: Vec::new(),
            sequence_index: 0,
            selections: Vec::new(),
            clicks_remaining: 0,
            level_correct: 0,
            level_total: 0,
            level_stats: Vec::new(),
            level_start_ms: 0,
            feedback: None,
        }
    }

    /// Session with the default level table
    pub fn with_defaults(seed: u64) -> Self {
        Self::new(seed, Settings::default())
    }

    pub fn level_config(&self) -> &LevelConfig {
        // Settings are validated in `new`, so the table is never empty here
        self.settings
            .level(self.level)
            .unwrap_or(&DEFAULT_LEVELS[0])
    }

    /// Challenge paired with the current sequence step
    ///
    /// The index is clamped to the last challenge when the blink sequence
    /// outruns the challenge list.
    pub fn active_challenge(&self) -> Option<&PatternChallenge> {
        let last = self.challenges.len().checked_sub(1)?;
        self.challenges.get(self.sequence_index.min(last))
    }

    /// Dot highlighted right now, if any
    pub fn highlighted_dot(&self) -> Option<usize> {
        match self.phase {
            GamePhase::Interleaved(SubPhase::Memorize) => self.blink_set.get(self.sequence_index),
            _ => None,
        }
    }

    /// Whether the answer buttons accept input
    pub fn accepts_answer(&self) -> bool {
        self.phase == GamePhase::Interleaved(SubPhase::Answer) && self.feedback.is_none()
    }

    /// Sum of the scores recorded for finished levels
    pub fn recorded_score(&self) -> i64 {
        self.level_stats.iter().map(|s| s.score).sum()
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.clock.time_remaining_secs()
    }

    /// Draw a seed for a follow-up session
    pub(crate) fn next_seed(&mut self) -> u64 {
        self.rng.random()
    }
}
