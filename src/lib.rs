//! Neon Breakout - a block-breaking arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (physics, collisions, power-ups, game state machine)
//! - `renderer`: Frame snapshots and CPU tessellation for the render sink
//! - `audio`: Audio sink boundary (fire-and-forget cues)
//! - `highscores`: Leaderboard collaborator
//! - `game`: Frame driver wiring input, simulation and sinks together
//! - `tuning`: Data-driven game balance
//! - `settings`: Presentation preferences

pub mod audio;
pub mod autopilot;
pub mod error;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{ConfigError, GameError};
pub use game::Game;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default playfield (square canvas)
    pub const PLAYFIELD_WIDTH: f32 = 600.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Keyboard paddle speed (pixels per tick)
    pub const PADDLE_SPEED: f32 = 25.0;
    /// Gap between paddle bottom and playfield bottom
    pub const PADDLE_BOTTOM_MARGIN: f32 = 10.0;

    /// Ball defaults (velocities are pixels per tick)
    pub const BALL_RADIUS: f32 = 8.0;
    pub const BALL_LAUNCH_SPEED: f32 = 9.0;
    pub const BALL_MIN_SPEED: f32 = 5.0;
    pub const BALL_MAX_SPEED: f32 = 16.0;
    /// Launch height above the playfield bottom
    pub const BALL_LAUNCH_OFFSET: f32 = 30.0;
    /// Trail points kept per ball
    pub const TRAIL_LENGTH: usize = 10;

    /// Brick grid
    pub const BRICK_ROWS: u32 = 6;
    pub const BRICK_COLS: u32 = 10;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_TOP_OFFSET: f32 = 50.0;

    /// Number of level patterns before the cycle repeats
    pub const PATTERN_COUNT: u32 = 4;

    /// Score values
    pub const POINTS_STANDARD: u64 = 10;
    pub const POINTS_TOUGH: u64 = 20;
    pub const POINTS_POWER_UP: u64 = 100;
    pub const POINTS_LEVEL_CLEAR: u64 = 500;

    pub const STARTING_LIVES: u32 = 4;
}

/// Rotate a vector by `angle` radians (counter-clockwise in math coordinates)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rescale `v` so its magnitude lies in `[min, max]`, keeping its direction.
///
/// A zero vector has no direction; it is pointed straight up (screen space)
/// at `min` so the ball can never stall.
#[inline]
pub fn clamp_speed(v: Vec2, min: f32, max: f32) -> Vec2 {
    let speed = v.length();
    if speed < f32::EPSILON {
        return Vec2::new(0.0, -min);
    }
    if speed < min {
        v * (min / speed)
    } else if speed > max {
        v * (max / speed)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_speed_preserves_direction() {
        let v = clamp_speed(Vec2::new(30.0, 40.0), 5.0, 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.x / v.y - 0.75).abs() < 1e-4);

        let v = clamp_speed(Vec2::new(0.3, 0.4), 5.0, 10.0);
        assert!((v.length() - 5.0).abs() < 1e-4);

        let v = clamp_speed(Vec2::new(3.0, 4.0), 2.0, 10.0);
        assert_eq!(v, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_clamp_speed_zero_vector_points_up() {
        let v = clamp_speed(Vec2::ZERO, 5.0, 10.0);
        assert_eq!(v, Vec2::new(0.0, -5.0));
    }
}
