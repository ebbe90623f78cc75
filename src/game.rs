//! Frame driver
//!
//! `Game` owns one session and its collaborators. Each `frame` polls the
//! input source, runs exactly one tick, hands sound cues to the audio sink
//! and a snapshot to the render sink. Collaborator failures are logged and
//! dropped; they never reach the simulation.

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::AudioSink;
use crate::error::{GameError, Result};
use crate::highscores::{HighScoreEntry, Leaderboard};
use crate::renderer::{Frame, RenderSink};
use crate::settings::Settings;
use crate::sim::events::GameEvent;
use crate::sim::state::{GameState, Playfield};
use crate::sim::tick::{PaddleIntent, TickInput, tick};
use crate::tuning::Tuning;

/// Produces the input for the next tick
pub trait InputSource {
    fn poll(&mut self, state: &GameState) -> TickInput;
}

/// Raw control state written by event handlers
#[derive(Debug, Clone, Default)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    /// Last pointer x in playfield coordinates; cleared by key presses
    pub pointer_x: Option<f32>,
    /// Pause toggle waiting for the next tick
    pub pause_requested: bool,
}

/// Input source fed by a shared [`Controls`] handle (keyboard and pointer)
#[derive(Debug, Clone, Default)]
pub struct ControlInput {
    controls: Rc<RefCell<Controls>>,
}

impl ControlInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for event handlers to write into
    pub fn handle(&self) -> Rc<RefCell<Controls>> {
        Rc::clone(&self.controls)
    }
}

impl InputSource for ControlInput {
    fn poll(&mut self, _state: &GameState) -> TickInput {
        let mut c = self.controls.borrow_mut();
        let paddle = match (c.left, c.right, c.pointer_x) {
            (true, false, _) => PaddleIntent::Left,
            (false, true, _) => PaddleIntent::Right,
            (false, false, Some(x)) => PaddleIntent::PointerX(x),
            _ => PaddleIntent::Hold,
        };
        TickInput {
            paddle,
            pause: std::mem::take(&mut c.pause_requested),
        }
    }
}

/// Everything a session talks to outside the simulation
pub struct Collaborators {
    /// Required; a session without input cannot start
    pub input: Option<Box<dyn InputSource>>,
    pub audio: Box<dyn AudioSink>,
    pub render: Box<dyn RenderSink>,
}

impl Collaborators {
    pub fn new(
        input: Box<dyn InputSource>,
        audio: Box<dyn AudioSink>,
        render: Box<dyn RenderSink>,
    ) -> Self {
        Self {
            input: Some(input),
            audio,
            render,
        }
    }
}

/// One running game with its collaborators
pub struct Game {
    state: GameState,
    input: Box<dyn InputSource>,
    audio: Box<dyn AudioSink>,
    render: Box<dyn RenderSink>,
    settings: Settings,
}

impl Game {
    /// Build and start a session. Fails without an input source or a usable
    /// playfield, or with invalid tuning.
    pub fn start(
        tuning: Tuning,
        playfield: Playfield,
        seed: u64,
        settings: Settings,
        collaborators: Collaborators,
        now_ms: f64,
    ) -> Result<Self> {
        let Collaborators {
            input,
            mut audio,
            render,
        } = collaborators;
        let input = input.ok_or(GameError::MissingInput)?;
        let mut state = GameState::new(tuning, playfield, seed)?;
        audio.configure(&settings);
        state.start(now_ms);

        Ok(Self {
            state,
            input,
            audio,
            render,
            settings,
        })
    }

    /// Run one tick at `now_ms`. Returns the events it produced. A finished
    /// game produces nothing and draws nothing.
    pub fn frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        if self.state.is_over() {
            return Vec::new();
        }

        let input = self.input.poll(&self.state);
        tick(&mut self.state, &input, now_ms);
        let events = self.state.drain_events();
        self.dispatch(&events);

        let frame = Frame::capture(&self.state, &events, &self.settings);
        self.render.present(&frame);
        events
    }

    fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            if let GameEvent::Sound(cue) = event
                && let Err(e) = self.audio.play(*cue)
            {
                log::warn!("Audio cue {:?} failed: {}", cue, e);
            }
        }
    }

    /// End the session. Idempotent; returns the final score.
    pub fn stop(&mut self) -> u64 {
        self.state.stop();
        // Stopping is silent: drop the Stopped marker rather than play it
        self.state.drain_events();
        self.state.score
    }

    /// Fresh session with the same tuning and collaborators
    pub fn restart(&mut self, seed: u64, now_ms: f64) {
        self.state.restart(seed);
        self.state.start(now_ms);
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.configure(&settings);
        self.settings = settings;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Score once the game is over
    pub fn final_score(&self) -> Option<u64> {
        self.state.final_score()
    }

    /// Submit the final score. Failures are logged, never propagated.
    pub fn submit_score(&self, board: &mut dyn Leaderboard, initials: &str) -> bool {
        let Some(score) = self.final_score() else {
            log::warn!("Score submitted before the game ended");
            return false;
        };
        match board.submit(initials, score) {
            Ok(()) => {
                log::info!("Submitted score {} for {}", score, initials);
                true
            }
            Err(e) => {
                log::warn!("High score submit failed: {}", e);
                false
            }
        }
    }
}

/// Fetch the board; a failing collaborator reads as an empty board
pub fn fetch_scores(board: &dyn Leaderboard) -> Vec<HighScoreEntry> {
    board.fetch().unwrap_or_else(|e| {
        log::warn!("High score fetch failed: {}", e);
        Vec::new()
    })
}
