//! Browser bindings
//!
//! The page owns rendering and the animation frame loop. It forwards player
//! input here, calls `frame` once per animation frame, and draws whatever
//! `view_json` returns.

use wasm_bindgen::prelude::*;

use super::FrameStepper;
use crate::settings::Settings;
use crate::sim::{SessionState, TickInput};
use crate::ui::SessionView;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Grid Challenge starting...");
}

/// A session driven from JavaScript
#[wasm_bindgen]
pub struct WebSession {
    state: SessionState,
    stepper: FrameStepper,
    input: TickInput,
}

#[wasm_bindgen]
impl WebSession {
    /// New session with the default level table; a seed of 0 picks one at random
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebSession {
        Self::with_settings(seed, Settings::default())
    }

    /// New session from a JSON settings document
    pub fn from_settings_json(seed: u64, json: &str) -> Result<WebSession, JsError> {
        let settings = Settings::from_json(json)?;
        Ok(Self::with_settings(seed, settings))
    }

    pub fn start_game(&mut self) {
        self.input.start = true;
    }

    pub fn submit_answer(&mut self, answer: bool) {
        self.input.answer = Some(answer);
    }

    pub fn click_dot(&mut self, index: u32) {
        self.input.click_dot = Some(index as usize);
    }

    pub fn restart(&mut self) {
        self.input.restart = true;
    }

    pub fn set_idle_mode(&mut self, enabled: bool) {
        self.input.idle_mode = enabled;
        log::info!("Idle mode: {enabled}");
    }

    /// Run the simulation up to `now_ms` (from `performance.now()`)
    pub fn frame(&mut self, now_ms: f64) {
        self.stepper.frame(&mut self.state, &mut self.input, now_ms);
    }

    /// Current view as JSON
    pub fn view_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&SessionView::capture(&self.state))?)
    }
}

impl WebSession {
    fn with_settings(seed: u64, settings: Settings) -> Self {
        let seed = if seed == 0 {
            (js_sys::Math::random() * u32::MAX as f64) as u64 ^ js_sys::Date::now() as u64
        } else {
            seed
        };
        log::info!("Session initialized with seed: {seed}");
        Self {
            state: SessionState::new(seed, settings),
            stepper: FrameStepper::new(),
            input: TickInput::default(),
        }
    }
}
