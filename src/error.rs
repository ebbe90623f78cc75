//! Error types for Neon Breakout
//!
//! Setup errors are fatal to starting a session. Collaborator errors (audio,
//! leaderboard) are returned to the driver, which logs and drops them.

use thiserror::Error;

/// Invalid or unreadable gameplay configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },

    #[error("Ball speed bounds inverted: min {min} must be below max {max}")]
    SpeedBounds { min: f32, max: f32 },

    #[error("Brick grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that prevent a session from starting
#[derive(Debug, Error)]
pub enum GameError {
    #[error("No rendering surface: playfield is {width}x{height}")]
    MissingSurface { width: f32, height: f32 },

    #[error("No input source attached")]
    MissingInput,

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Audio playback failures (never affect game state)
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio unavailable: {0}")]
    Unavailable(String),

    #[error("Playback rejected: {0}")]
    Rejected(String),
}

/// Leaderboard collaborator failures (never affect game state)
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("Initials must be three ASCII letters, got {0:?}")]
    InvalidInitials(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Leaderboard unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for session setup
pub type Result<T> = std::result::Result<T, GameError>;
