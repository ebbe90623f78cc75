//! JavaScript-facing game handle
//!
//! The host page owns the animation loop and the canvas. It forwards input
//! events, calls `frame(now)` once per display frame and paints the returned
//! JSON snapshot.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

use crate::audio::{AudioSink, LogAudioSink, WebAudioSink};
use crate::autopilot::Autopilot;
use crate::game::{Collaborators, ControlInput, Controls, Game, InputSource, fetch_scores};
use crate::highscores::StoredLeaderboard;
use crate::renderer::{Frame, RenderSink};
use crate::settings::{QualityPreset, Settings};
use crate::sim::state::Playfield;
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Logger already installed by the host
        return;
    }
    log::info!("Neon Breakout loaded");
}

/// Render sink that keeps the latest frame as JSON for the page
struct JsonSink(Rc<RefCell<String>>);

impl RenderSink for JsonSink {
    fn present(&mut self, frame: &Frame) {
        match frame.to_json() {
            Ok(json) => *self.0.borrow_mut() = json,
            Err(e) => log::warn!("Frame serialization failed: {}", e),
        }
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebGame {
    game: Option<Game>,
    controls: Rc<RefCell<Controls>>,
    frame_json: Rc<RefCell<String>>,
    tuning: Tuning,
    settings: Settings,
    playfield: Playfield,
    board: StoredLeaderboard,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> WebGame {
        WebGame {
            game: None,
            controls: Rc::new(RefCell::new(Controls::default())),
            frame_json: Rc::new(RefCell::new(String::new())),
            tuning: Tuning::default(),
            settings: Settings::load(),
            playfield: Playfield::new(width, height),
            board: StoredLeaderboard::open(),
        }
    }

    /// Replace the gameplay tuning; applies from the next start
    pub fn set_tuning(&mut self, json: &str) -> Result<(), JsValue> {
        self.tuning = Tuning::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Start a player-controlled game
    pub fn start(&mut self, now_ms: f64) -> Result<(), JsValue> {
        let input = ControlInput::new();
        self.controls = input.handle();
        self.launch(Box::new(input), now_ms)
    }

    /// Start an attract-mode game played by the autopilot
    pub fn start_demo(&mut self, now_ms: f64) -> Result<(), JsValue> {
        self.launch(Box::new(Autopilot::new()), now_ms)
    }

    fn launch(&mut self, input: Box<dyn InputSource>, now_ms: f64) -> Result<(), JsValue> {
        let audio: Box<dyn AudioSink> = match WebAudioSink::new(&self.settings) {
            Ok(sink) => Box::new(sink),
            Err(e) => {
                log::warn!("{} - audio disabled", e);
                Box::new(LogAudioSink::new(&self.settings))
            }
        };
        let game = Game::start(
            self.tuning.clone(),
            self.playfield,
            crate::platform::clock_seed(),
            self.settings.clone(),
            Collaborators::new(input, audio, Box::new(JsonSink(Rc::clone(&self.frame_json)))),
            now_ms,
        )
        .map_err(js_error)?;
        self.game = Some(game);
        Ok(())
    }

    /// Advance one tick and return the frame snapshot as JSON
    pub fn frame(&mut self, now_ms: f64) -> String {
        if let Some(game) = self.game.as_mut() {
            game.frame(now_ms);
        }
        self.frame_json.borrow().clone()
    }

    /// End the game; returns the final score. Safe to call repeatedly.
    pub fn stop(&mut self) -> f64 {
        self.game.as_mut().map(|g| g.stop() as f64).unwrap_or(0.0)
    }

    pub fn restart(&mut self, now_ms: f64) {
        if let Some(game) = self.game.as_mut() {
            game.restart(crate::platform::clock_seed(), now_ms);
        }
    }

    pub fn is_over(&self) -> bool {
        self.game.as_ref().is_none_or(|g| g.is_over())
    }

    /// Pointer x in playfield coordinates
    pub fn pointer_move(&mut self, x: f32) {
        self.controls.borrow_mut().pointer_x = Some(x);
    }

    /// Keyboard state change (`KeyboardEvent.key`)
    pub fn key(&mut self, key: &str, down: bool) {
        let mut c = self.controls.borrow_mut();
        match key {
            "ArrowLeft" | "a" | "A" => {
                c.left = down;
                c.pointer_x = None;
            }
            "ArrowRight" | "d" | "D" => {
                c.right = down;
                c.pointer_x = None;
            }
            "p" | "P" | "Escape" if down => c.pause_requested = true,
            _ => {}
        }
    }

    /// Whether the final score would make the board
    pub fn qualifies(&self) -> bool {
        self.game
            .as_ref()
            .and_then(|g| g.final_score())
            .is_some_and(|score| self.board.scores().qualifies(score))
    }

    pub fn submit_score(&mut self, initials: &str) -> bool {
        match self.game.as_ref() {
            Some(game) => game.submit_score(&mut self.board, initials),
            None => false,
        }
    }

    /// Leaderboard entries as JSON
    pub fn leaderboard(&self) -> String {
        serde_json::to_string(&fetch_scores(&self.board)).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn set_quality(&mut self, preset: &str) {
        if let Some(preset) = QualityPreset::parse(preset) {
            self.settings.apply_preset(preset);
            self.settings.save();
            if let Some(game) = self.game.as_mut() {
                game.apply_settings(self.settings.clone());
            }
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.settings.save();
        if let Some(game) = self.game.as_mut() {
            game.apply_settings(self.settings.clone());
        }
    }
}
