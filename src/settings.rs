//! Session configuration
//!
//! Loaded from JSON (every field optional) and validated before a session
//! is built from it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::tuning::{LevelConfig, default_levels};

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("failed to read settings from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings document is not valid JSON for this schema
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The level table is empty
    #[error("level table must contain at least one level")]
    NoLevels,

    /// A level entry is out of range (levels are 1-based)
    #[error("level {level}: {reason}")]
    InvalidLevel { level: usize, reason: String },

    /// A session-wide duration is out of range
    #[error("invalid timing: {0}")]
    InvalidTiming(String),
}

/// Tunable session parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whole-game countdown (seconds)
    pub total_game_time_secs: u32,
    /// Answer lockout after each judgment
    pub feedback_delay_ms: u64,
    /// Pause between the final recall click and level completion
    pub recall_complete_delay_ms: u64,
    /// Level table; its length is the final level
    pub levels: Vec<LevelConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_game_time_secs: TOTAL_GAME_TIME_SECS,
            feedback_delay_ms: FEEDBACK_DELAY_MS,
            recall_complete_delay_ms: RECALL_COMPLETE_DELAY_MS,
            levels: default_levels(),
        }
    }
}

impl Settings {
    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!(
            "Loaded settings from {} ({} levels)",
            path.display(),
            settings.levels.len()
        );
        Ok(settings)
    }

    /// Check every value the session engine relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.total_game_time_secs == 0 {
            return Err(SettingsError::InvalidTiming(
                "total_game_time_secs must be at least 1".into(),
            ));
        }
        if self.feedback_delay_ms > MAX_GRACE_DELAY_MS {
            return Err(SettingsError::InvalidTiming(format!(
                "feedback_delay_ms must be at most {MAX_GRACE_DELAY_MS}, got {}",
                self.feedback_delay_ms
            )));
        }
        if self.recall_complete_delay_ms > MAX_GRACE_DELAY_MS {
            return Err(SettingsError::InvalidTiming(format!(
                "recall_complete_delay_ms must be at most {MAX_GRACE_DELAY_MS}, got {}",
                self.recall_complete_delay_ms
            )));
        }
        if self.levels.is_empty() {
            return Err(SettingsError::NoLevels);
        }

        for (i, level) in self.levels.iter().enumerate() {
            let invalid = |reason: String| SettingsError::InvalidLevel {
                level: i + 1,
                reason,
            };

            if level.dots == 0 || level.dots > TOTAL_DOTS {
                return Err(invalid(format!(
                    "dots must be within 1..={TOTAL_DOTS}, got {}",
                    level.dots
                )));
            }
            if level.pattern_checks == 0 {
                return Err(invalid("pattern_checks must be at least 1".into()));
            }
            if level.blink_duration_ms == 0 {
                return Err(invalid("blink_duration_ms must be positive".into()));
            }
            if level.pattern_time_ms == 0 {
                return Err(invalid("pattern_time_ms must be positive".into()));
            }
            if level.pattern_checks != level.dots {
                log::debug!(
                    "Level {} has {} challenges for {} blinks; the blink sequence drives the loop",
                    i + 1,
                    level.pattern_checks,
                    level.dots
                );
            }
        }

        Ok(())
    }

    /// Number of levels in a full game
    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Config for a 1-based level, clamped into the table
    ///
    /// `None` only for an empty table, which `validate` rejects.
    pub fn level(&self, level: u32) -> Option<&LevelConfig> {
        let last = self.levels.len().checked_sub(1)?;
        let index = (level.max(1) as usize - 1).min(last);
        self.levels.get(index)
    }
}
