//! Answer scoring
//!
//! Reward and penalty both scale with the level multiplier `1 + (level-1)*0.2`.
//! The multiplier is kept in tenths so every result is exact integer
//! arithmetic; flooring uses `div_euclid` so penalties round toward -inf.

use crate::tuning::LevelConfig;

/// Base points for a correct judgment or recall
pub const CORRECT_BASE: i64 = 3;
/// Base points for a wrong (or timed-out) answer
pub const INCORRECT_BASE: i64 = -1;

/// Level multiplier in tenths (level 1 -> 10, level 6 -> 20)
pub fn multiplier_tenths(level: u32) -> i64 {
    10 + 2 * (level.max(1) as i64 - 1)
}

/// Level multiplier as a float, for display
pub fn level_multiplier(level: u32) -> f64 {
    multiplier_tenths(level) as f64 / 10.0
}

/// `floor(base * multiplier)` for a single answer
pub fn points(level: u32, correct: bool) -> i64 {
    let base = if correct { CORRECT_BASE } else { INCORRECT_BASE };
    (base * multiplier_tenths(level)).div_euclid(10)
}

/// Progress-bar denominator: `sum floor((checks + dots) * 3 * multiplier)` over levels
pub fn max_possible_score(levels: &[LevelConfig]) -> i64 {
    levels
        .iter()
        .zip(1u32..)
        .map(|(config, level)| {
            let answers = (config.pattern_checks + config.dots) as i64;
            (answers * CORRECT_BASE * multiplier_tenths(level)).div_euclid(10)
        })
        .sum()
}

/// Most points a perfect player can actually earn on one level
pub fn level_max_points(level: u32, config: &LevelConfig) -> i64 {
    let answers = (config.interleaved_steps() + config.dots) as i64;
    answers * points(level, true)
}
