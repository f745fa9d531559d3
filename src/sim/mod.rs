//! Deterministic session engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only moves through `advance`/`tick`
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod clock;
pub mod dots;
pub mod patterns;
pub mod scoring;
pub mod state;
pub mod tick;

pub use clock::{Countdown, FiredTask, Scheduler, SessionClock, TaskId, TimerOwner};
pub use dots::{BlinkSet, DotField, choose_blink_set, generate_dot_field};
pub use patterns::{
    ChallengeKind, ChallengePatterns, Edge, Grid, GridPattern, LineComplexity, LinePattern,
    Operation, PatternChallenge, PatternCompletion, SymmetryKind, generate_grid_pattern,
    generate_level_challenges, generate_line_pattern, generate_pattern_challenge,
    generate_pattern_completion, generate_tricky_pattern, is_grid_rotationally_symmetric,
    rotate_grid90,
};
pub use scoring::{level_max_points, level_multiplier, max_possible_score, points};
pub use state::{Feedback, FeedbackKind, GamePhase, LevelStats, SessionState, SubPhase};
pub use tick::{
    TickInput, advance, click_dot, complete_level, restart, start_game, start_level, submit_answer,
    tick,
};
