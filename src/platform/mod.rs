//! Platform abstraction layer
//!
//! Hosts the engine on a platform:
//! - Wall-clock frames into fixed simulation steps
//! - Player input into session events
//! - Session view out to the page (wasm32)

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::sim::{SessionState, TickInput, tick};

/// Turns variable frame times into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameStepper {
    accumulator_ms: f64,
    last_time_ms: Option<f64>,
}

impl FrameStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the session to wall-clock time `now_ms`
    ///
    /// One-shot input is applied on the first substep only. Returns the
    /// number of substeps run.
    pub fn frame(&mut self, state: &mut SessionState, input: &mut TickInput, now_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => (now_ms - last).clamp(0.0, 100.0),
            None => 0.0,
        };
        self.last_time_ms = Some(now_ms);
        self.accumulator_ms += dt;

        let step = SIM_DT_MS as f64;
        let mut substeps = 0;
        while self.accumulator_ms >= step && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT_MS);
            self.accumulator_ms -= step;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.start = false;
            input.answer = None;
            input.click_dot = None;
            input.restart = false;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[test]
    fn test_first_frame_only_primes() {
        let mut state = SessionState::with_defaults(1);
        let mut stepper = FrameStepper::new();
        let mut input = TickInput::default();
        assert_eq!(stepper.frame(&mut state, &mut input, 1000.0), 0);
        assert_eq!(state.clock.now_ms(), 0);
    }

    #[test]
    fn test_one_shot_input_consumed() {
        let mut state = SessionState::with_defaults(1);
        let mut stepper = FrameStepper::new();
        let mut input = TickInput {
            start: true,
            ..Default::default()
        };
        stepper.frame(&mut state, &mut input, 0.0);
        assert!(input.start);

        let steps = stepper.frame(&mut state, &mut input, 100.0);
        assert_eq!(steps, 2);
        assert!(!input.start);
        assert!(matches!(state.phase, GamePhase::Interleaved(_)));
        assert_eq!(state.clock.now_ms(), 100);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut state = SessionState::with_defaults(1);
        let mut stepper = FrameStepper::new();
        let mut input = TickInput::default();
        stepper.frame(&mut state, &mut input, 0.0);
        // A 5 s stall only feeds 100 ms into the accumulator
        assert_eq!(stepper.frame(&mut state, &mut input, 5000.0), 2);
    }
}
