//! Browser front door
//!
//! A thin wasm-bindgen wrapper around the simulation. The page owns the
//! canvas, the input listeners and `requestAnimationFrame`; it forwards lane
//! commands here, calls `tick` every frame and reads JSON back.

use wasm_bindgen::prelude::*;

use crate::audio::WebAudio;
use crate::consts::EVENT_QUEUE_CAPACITY;
use crate::highscores::HighScores;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    audio: WebAudio,
    high_scores: HighScores,
    input: TickInput,
    /// Events kept until the page asks for them, newest `EVENT_QUEUE_CAPACITY`
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a run. Without a seed the wall clock is used.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> WebGame {
        console_error_panic_hook::set_once();
        // A second instance finds the logger already installed
        let _ = console_log::init_with_level(log::Level::Info);

        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        log::info!("Stroop Rider starting, seed={seed}");
        WebGame {
            state: GameState::new(seed, Settings::load()),
            audio: WebAudio::new(),
            high_scores: HighScores::load(),
            input: TickInput::default(),
            events: Vec::new(),
        }
    }

    /// Throw the current run away and start another with the stored settings
    pub fn restart(&mut self, seed: Option<f64>) {
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        self.state = GameState::new(seed, Settings::load());
        self.input = TickInput::default();
        self.events.clear();
    }

    /// Advance to the frame timestamp from `requestAnimationFrame`
    pub fn tick(&mut self, timestamp_ms: f64) {
        let input = std::mem::take(&mut self.input);
        let autopilot = input.autopilot;
        tick(&mut self.state, &input, timestamp_ms);
        // Autopilot is sticky, everything else is one-shot
        self.input.autopilot = autopilot;

        self.state.flush_audio(&mut self.audio);
        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::HapticPulse { ms } => vibrate(*ms),
                GameEvent::GameOver { final_score, elapsed_ms } => {
                    self.record_score(*final_score, *elapsed_ms)
                }
                _ => {}
            }
        }
        self.events.extend(events);
        let excess = self.events.len().saturating_sub(EVENT_QUEUE_CAPACITY);
        if excess > 0 {
            self.events.drain(..excess);
        }
    }

    /// Absolute lane from a tap or click
    pub fn set_lane(&mut self, lane: i32) {
        self.input.target_lane = Some(lane);
    }

    /// Relative lane move from the keyboard
    pub fn step_lane(&mut self, delta: i32) {
        self.input.step += delta;
    }

    pub fn toggle_pause(&mut self) {
        self.input.pause = !self.input.pause;
    }

    /// Menu, settings or tutorial overlay
    pub fn set_menu_paused(&mut self, paused: bool) {
        self.state.set_menu_paused(paused);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.input.autopilot = enabled;
    }

    /// Must be called from a user gesture before sound can play
    pub fn unlock_audio(&self) {
        self.audio.resume();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.audio.set_volume(volume);
    }

    pub fn is_over(&self) -> bool {
        self.state.phase == GamePhase::GameOver
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|e| {
            log::warn!("Failed to serialize snapshot: {e}");
            "null".to_string()
        })
    }

    /// Events emitted since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).unwrap_or_else(|e| {
            log::warn!("Failed to serialize events: {e}");
            "[]".to_string()
        })
    }

    pub fn settings_json(&self) -> String {
        self.state.settings.to_json().unwrap_or_else(|e| {
            log::warn!("Failed to serialize settings: {e}");
            "{}".to_string()
        })
    }

    /// Replace settings from the page's settings screen. Practice changes
    /// take effect on the next restart.
    pub fn apply_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        settings.save();
        self.state.apply_settings(settings);
        Ok(())
    }

    pub fn high_scores_json(&self) -> String {
        self.high_scores.to_json().unwrap_or_else(|e| {
            log::warn!("Failed to serialize high scores: {e}");
            "{\"entries\":[]}".to_string()
        })
    }
}

impl WebGame {
    fn record_score(&mut self, score: u64, elapsed_ms: f64) {
        if self.state.settings.practice.is_active() {
            log::info!("Practice run, score not recorded");
            return;
        }
        if let Some(rank) = self.high_scores.record(score, elapsed_ms, js_sys::Date::now()) {
            log::info!("New high score #{rank}: {score}");
            if let Err(e) = self.high_scores.save() {
                log::warn!("Failed to save high scores: {e}");
            }
        }
    }
}

fn vibrate(ms: u32) {
    if let Some(window) = web_sys::window() {
        let _ = window.navigator().vibrate_with_duration(ms);
    }
}
