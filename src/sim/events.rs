//! Events emitted by the simulation during a tick
//!
//! The core never waits on the presentation layer: events are queued on the
//! game state and drained by the driver after the tick completes.

use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// Discrete sound cues for the audio sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    PaddleHit,
    BrickHit,
    WallHit,
    PowerUpCollected,
    LevelUp,
    LifeLost,
    GameOver,
}

/// Something the presentation layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Play a sound
    Sound(AudioCue),
    /// Full-field color flash for a collected power-up
    Flash(PowerUpKind),
    /// A brick lost its last hit point
    BrickDestroyed { tough: bool, points: u64 },
    /// Level cleared; `next_level` is already generated
    LevelCleared { bonus: u64, next_level: u32, loops: u32 },
    /// Every ball was lost in one tick
    LifeLost { lives_left: u32 },
    /// Lives ran out; the score is final
    GameOver { final_score: u64 },
    /// The session was ended explicitly
    Stopped { final_score: u64 },
}
