//! Data-driven level balance
//!
//! Every difficulty knob the session engine reads lives in this table.
//! Editing it changes how the game plays without touching any logic.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Static parameters for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Dots revealed (and later recalled) this level
    pub dots: usize,
    /// Pattern challenges generated at level start
    pub pattern_checks: usize,
    /// How long each dot stays highlighted
    pub blink_duration_ms: u32,
    /// Answer window for each challenge
    pub pattern_time_ms: u32,
    pub description: Cow<'static, str>,
    /// Informational; rotation grids are sized from the level number
    pub grid_size: usize,
    /// Informational; not consulted by the session engine
    pub tricky_chance: f32,
}

impl LevelConfig {
    const fn new(
        dots: usize,
        pattern_checks: usize,
        blink_duration_ms: u32,
        pattern_time_ms: u32,
        description: &'static str,
        grid_size: usize,
        tricky_chance: f32,
    ) -> Self {
        Self {
            dots,
            pattern_checks,
            blink_duration_ms,
            pattern_time_ms,
            description: Cow::Borrowed(description),
            grid_size,
            tricky_chance,
        }
    }

    /// Memorize/answer pairs played before recall
    ///
    /// The blink sequence drives the interleaved loop, so trailing
    /// challenges beyond `dots` are never presented.
    pub fn interleaved_steps(&self) -> usize {
        self.dots
    }
}

/// The shipped six-level progression
pub static DEFAULT_LEVELS: [LevelConfig; 6] = [
    LevelConfig::new(3, 3, 2500, 7000, "Basic Rotation", 4, 0.0),
    LevelConfig::new(4, 4, 2200, 6500, "Pattern Addition", 4, 0.1),
    LevelConfig::new(5, 5, 2000, 6000, "Advanced Rotation", 5, 0.2),
    LevelConfig::new(4, 5, 1800, 5500, "Pattern Arithmetic", 5, 0.3),
    LevelConfig::new(5, 6, 1600, 5000, "Complex Patterns", 6, 0.4),
    LevelConfig::new(6, 7, 1400, 4500, "Master Challenge", 6, 0.5),
];

/// Owned copy of the default table
pub fn default_levels() -> Vec<LevelConfig> {
    DEFAULT_LEVELS.to_vec()
}
