//! Grid Challenge - a timed memory and pattern-judgment game
//!
//! Core modules:
//! - `sim`: Deterministic session engine (pattern generation, clock, state machine)
//! - `tuning`: Data-driven level table
//! - `settings`: Session configuration
//! - `report`: End-of-game statistics
//! - `ui`: View snapshot consumed by any renderer
//! - `platform`: Browser bindings

pub mod platform;
pub mod report;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use report::{Grade, SessionSummary};
pub use settings::{Settings, SettingsError};
pub use tuning::LevelConfig;
pub use ui::SessionView;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: u64 = 50;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play area the dot field is scattered over
    pub const CANVAS_WIDTH: f32 = 1000.0;
    pub const CANVAS_HEIGHT: f32 = 500.0;
    /// Rendered dot diameter; dots keep half of it clear of the canvas edge
    pub const DOT_SIZE: f32 = 32.0;

    /// Dots in every field
    pub const TOTAL_DOTS: usize = 30;
    /// Minimum spacing between dot centres
    pub const MIN_DOT_DISTANCE: f32 = 40.0;
    /// Candidate positions tried per dot before settling for the best miss
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

    /// Whole-game time budget (seconds)
    pub const TOTAL_GAME_TIME_SECS: u32 = 240;
    /// Countdown cadence
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;
    /// Answers are locked while feedback is on screen
    pub const FEEDBACK_DELAY_MS: u64 = 1000;
    /// Pause between the last recall click and level completion
    pub const RECALL_COMPLETE_DELAY_MS: u64 = 500;
    /// Upper bound for the configurable grace delays (ms)
    pub const MAX_GRACE_DELAY_MS: u64 = 60_000;

    /// Line patterns live on a 3x3 lattice
    pub const LINE_GRID_DOTS: usize = 9;
    /// Lattice spacing for line-pattern dots
    pub const LINE_DOT_SPACING: f32 = 40.0;
    pub const LINE_DOT_OFFSET: f32 = 20.0;

    /// Highest level the generators scale with
    pub const MAX_DIFFICULTY: u32 = 6;
    /// Grid sizes are clamped into this range
    pub const MIN_GRID_SIZE: usize = 2;
    pub const MAX_GRID_SIZE: usize = 16;
}

/// A position in the play area (or on the line-pattern lattice)
pub type Point = glam::Vec2;

/// Format whole seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
