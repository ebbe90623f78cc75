//! Render-sink boundary
//!
//! Once per tick the driver captures a [`Frame`]: a read-only snapshot of
//! everything drawable plus the HUD. A host painter either consumes it as JSON
//! or asks [`shapes::tessellate`] for a flat triangle list.

pub mod shapes;
pub mod vertex;

use glam::Vec2;
use serde::Serialize;

use crate::settings::Settings;
use crate::sim::events::GameEvent;
use crate::sim::shape::BrickShape;
use crate::sim::state::{BrickKind, GamePhase, GameState, Playfield, PowerUpKind};

pub use vertex::Vertex;

/// Something that paints frames. Never touches the simulation.
pub trait RenderSink {
    fn present(&mut self, frame: &Frame);
}

/// Sink that draws nothing (headless runs)
#[derive(Debug, Default)]
pub struct NullRenderSink;

impl RenderSink for NullRenderSink {
    fn present(&mut self, _frame: &Frame) {}
}

#[derive(Debug, Clone, Serialize)]
pub struct PaddleView {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    /// Newest first, already cut to the trail quality
    pub trail: Vec<TrailView>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrailView {
    pub pos: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrickView {
    pub kind: BrickKind,
    pub hp: u8,
    pub pattern_id: u8,
    pub color: u32,
    pub shape: BrickShape,
}

#[derive(Debug, Clone, Serialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    /// Fades from 1 to 0 over the particle lifetime
    pub alpha: f32,
}

/// Values shown in the heads-up display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: u32,
    pub level: u32,
    pub loops: u32,
}

/// Everything a painter needs for one tick
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub phase: GamePhase,
    pub playfield: Playfield,
    pub paddle: PaddleView,
    pub balls: Vec<BallView>,
    pub bricks: Vec<BrickView>,
    pub power_ups: Vec<PowerUpView>,
    pub particles: Vec<ParticleView>,
    pub hud: Hud,
    /// Current ball speed bounds, for speed-tinted trails
    pub speed_range: (f32, f32),
    /// Full-field flash color for a power-up collected this tick
    pub flash: Option<u32>,
}

impl Frame {
    /// Snapshot the session. `events` are the ones drained after this tick.
    pub fn capture(state: &GameState, events: &[GameEvent], settings: &Settings) -> Self {
        let paddle = PaddleView {
            pos: state.paddle.pos,
            width: state.paddle.width,
            height: state.paddle.height,
        };

        let balls = state
            .balls
            .iter()
            .map(|ball| BallView {
                pos: ball.pos,
                radius: ball.radius,
                color: ball.color,
                trail: ball
                    .trail
                    .iter()
                    .take(settings.trail_points(ball.trail.len()))
                    .map(|p| TrailView {
                        pos: p.pos,
                        speed: p.speed,
                    })
                    .collect(),
            })
            .collect();

        let bricks = state
            .bricks
            .iter()
            .map(|brick| BrickView {
                kind: brick.kind,
                hp: brick.hp,
                pattern_id: brick.pattern_id,
                color: brick.kind.color(),
                shape: brick.shape.clone(),
            })
            .collect();

        let power_ups = state
            .power_ups
            .iter()
            .map(|p| PowerUpView {
                kind: p.kind,
                pos: p.pos,
                size: p.size,
                color: p.kind.color(),
            })
            .collect();

        let lifetime = state.tuning.particle_lifetime.max(1) as f32;
        let particles = state
            .particles
            .iter()
            .take(settings.max_particles())
            .map(|p| ParticleView {
                pos: p.pos,
                size: p.size,
                color: p.color,
                alpha: (p.life as f32 / lifetime).clamp(0.0, 1.0),
            })
            .collect();

        let flash = if settings.effective_flash() {
            events.iter().rev().find_map(|e| match e {
                GameEvent::Flash(kind) => Some(kind.color()),
                _ => None,
            })
        } else {
            None
        };

        Self {
            tick: state.time_ticks,
            phase: state.phase,
            playfield: state.playfield,
            paddle,
            balls,
            bricks,
            power_ups,
            particles,
            hud: Hud {
                score: state.score,
                lives: state.lives,
                level: state.level,
                loops: state.loops,
            },
            speed_range: state.speed_bounds(),
            flash,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::QualityPreset;
    use crate::tuning::Tuning;

    fn state() -> GameState {
        let mut state = GameState::new(Tuning::default(), Playfield::new(600.0, 600.0), 77).unwrap();
        state.start(0.0);
        state
    }

    #[test]
    fn test_capture_mirrors_state() {
        let state = state();
        let frame = Frame::capture(&state, &[], &Settings::default());
        assert_eq!(frame.bricks.len(), state.bricks.len());
        assert_eq!(frame.balls.len(), 1);
        assert_eq!(
            frame.hud,
            Hud {
                score: 0,
                lives: 4,
                level: 1,
                loops: 0
            }
        );
        assert_eq!(frame.flash, None);
    }

    #[test]
    fn test_flash_respects_settings() {
        let state = state();
        let events = [GameEvent::Flash(PowerUpKind::SlowBall)];
        let frame = Frame::capture(&state, &events, &Settings::default());
        assert_eq!(frame.flash, Some(PowerUpKind::SlowBall.color()));

        let low = Settings::from_preset(QualityPreset::Low);
        let frame = Frame::capture(&state, &events, &low);
        assert_eq!(frame.flash, None);
    }

    #[test]
    fn test_particles_capped_by_settings() {
        let mut state = state();
        state.burst(Vec2::new(100.0, 100.0), 40, 0xffffff);
        let mut settings = Settings::default();
        settings.particles = false;
        let frame = Frame::capture(&state, &[], &settings);
        assert!(frame.particles.is_empty());
    }

    #[test]
    fn test_frame_serializes() {
        let state = state();
        let json = Frame::capture(&state, &[], &Settings::default())
            .to_json()
            .unwrap();
        assert!(json.contains("\"hud\""));
        assert!(json.contains("\"Rect\""));
    }
}
