//! End-of-game statistics
//!
//! Derived entirely from the recorded level stats; nothing here is stored.

use serde::{Deserialize, Serialize};

use crate::sim::{LevelStats, SessionState};

/// Letter grade from overall judgment accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    APlus,
    A,
    B,
    C,
    D,
    /// No level was finished
    NotAvailable,
}

impl Grade {
    pub fn from_accuracy(accuracy_percent: f64) -> Self {
        if accuracy_percent >= 90.0 {
            Grade::APlus
        } else if accuracy_percent >= 80.0 {
            Grade::A
        } else if accuracy_percent >= 70.0 {
            Grade::B
        } else if accuracy_percent >= 60.0 {
            Grade::C
        } else {
            Grade::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::NotAvailable => "N/A",
        }
    }
}

/// Per-level line of the breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLine {
    pub level: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
    pub accuracy_percent: f64,
    pub score: i64,
    pub time_spent_secs: f64,
}

impl From<&LevelStats> for LevelLine {
    fn from(stats: &LevelStats) -> Self {
        Self {
            level: stats.level,
            correct_answers: stats.correct_answers,
            total_answers: stats.total_answers,
            accuracy_percent: stats.accuracy_percent(),
            score: stats.score,
            time_spent_secs: stats.time_spent_ms as f64 / 1000.0,
        }
    }
}

/// Final results of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub final_score: i64,
    pub levels_completed: usize,
    pub level_count: u32,
    pub total_correct: u32,
    pub total_answers: u32,
    pub accuracy_percent: f64,
    pub grade: Grade,
    pub time_remaining_secs: u32,
    pub levels: Vec<LevelLine>,
}

impl SessionSummary {
    pub fn from_state(state: &SessionState) -> Self {
        let stats = &state.level_stats;
        let total_correct: u32 = stats.iter().map(|s| s.correct_answers).sum();
        let total_answers: u32 = stats.iter().map(|s| s.total_answers).sum();
        let accuracy_percent = if total_answers > 0 {
            f64::from(total_correct) / f64::from(total_answers) * 100.0
        } else {
            0.0
        };
        let grade = if stats.is_empty() {
            Grade::NotAvailable
        } else {
            Grade::from_accuracy(accuracy_percent)
        };

        Self {
            final_score: state.score,
            levels_completed: stats.len(),
            level_count: state.settings.level_count(),
            total_correct,
            total_answers,
            accuracy_percent,
            grade,
            time_remaining_secs: state.time_remaining_secs(),
            levels: stats.iter().map(LevelLine::from).collect(),
        }
    }

    /// Time left formatted as `m:ss`
    pub fn time_remaining_label(&self) -> String {
        crate::format_time(self.time_remaining_secs)
    }
}
