//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick, velocities in pixels per tick
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod events;
pub mod level;
pub mod powerup;
pub mod shape;
pub mod state;
pub mod tick;

pub use collision::{CollisionResult, ball_brick_collision, bounce_dominant_axis};
pub use events::{AudioCue, GameEvent};
pub use level::{LevelTheme, Pattern, generate_level};
pub use shape::{Aabb, BrickShape};
pub use state::{
    ActiveEffects, Ball, Brick, BrickKind, GamePhase, GameState, Paddle, Particle, Playfield,
    PowerUp, PowerUpKind,
};
pub use tick::{PaddleIntent, TickInput, tick};
