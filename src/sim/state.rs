//! Game state and core simulation types
//!
//! `GameState` is the session aggregate: score, lives, level, every entity
//! collection, effect deadlines and the RNG all live on it. Nothing in the
//! simulation reads global state.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::level;
use super::shape::{Aabb, BrickShape};
use crate::error::GameError;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, waiting for `start`
    Idle,
    /// Active gameplay
    Running,
    /// Ticks are ignored until unpaused
    Paused,
    /// Terminal: only `restart` leaves this phase
    GameOver,
}

/// Playfield dimensions (the rendering surface)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// A surface must have positive, finite extent
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Neon palette for balls (0xRRGGBB)
pub const NEON_COLORS: [u32; 7] = [
    0xff00ff, // Neon pink
    0x00ffff, // Neon cyan
    0x00ff00, // Neon green
    0xffff00, // Neon yellow
    0xff9900, // Neon orange
    0xff0066, // Hot pink
    0x3300ff, // Neon blue
];

/// Ball tint while slow-ball is active
pub const SLOW_BALL_COLOR: u32 = 0x0088ff;

/// Trail point for ball rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub speed: f32,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    /// Stored velocity (pixels per tick), always within the speed bounds
    pub vel: Vec2,
    pub radius: f32,
    /// Radius to restore when slow-ball ends
    pub base_radius: f32,
    pub color: u32,
    /// Trail history for rendering (newest first)
    pub trail: Vec<TrailPoint>,
    /// Marked this tick for removal (fell out of the playfield)
    #[serde(skip)]
    pub lost: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: u32) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            base_radius: radius,
            color,
            trail: Vec::with_capacity(crate::consts::TRAIL_LENGTH),
            lost: false,
        }
    }

    /// Record current position to trail (call each tick)
    pub fn record_trail(&mut self) {
        let speed = self.vel.length();
        self.trail.insert(0, TrailPoint { pos: self.pos, speed });
        if self.trail.len() > crate::consts::TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    /// Width outside any widen effect
    pub base_width: f32,
    /// Signed horizontal velocity (pixels per tick)
    pub vel_x: f32,
}

impl Paddle {
    /// Centered paddle resting `bottom_margin` above the playfield bottom
    pub fn new(playfield: Playfield, width: f32, height: f32, bottom_margin: f32) -> Self {
        Self {
            pos: Vec2::new(
                playfield.width / 2.0 - width / 2.0,
                playfield.height - height - bottom_margin,
            ),
            width,
            height,
            base_width: width,
            vel_x: 0.0,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.width / 2.0
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_rect(self.pos.x, self.pos.y, self.width, self.height)
    }

    /// Keep the paddle inside `[0, playfield_width - width]`
    pub fn clamp_to(&mut self, playfield_width: f32) {
        let max_x = (playfield_width - self.width).max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    /// Change width around the current center, then re-clamp
    pub fn set_width(&mut self, width: f32, playfield_width: f32) {
        let center = self.center_x();
        self.width = width.min(playfield_width);
        self.pos.x = center - self.width / 2.0;
        self.clamp_to(playfield_width);
    }
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Standard,
    /// Needs two hits
    Tough,
}

/// A brick entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub kind: BrickKind,
    /// Hits remaining; the brick is removed in the tick this reaches 0
    pub hp: u8,
    pub shape: BrickShape,
    /// Level pattern that produced the brick (render decoration only)
    pub pattern_id: u8,
}

impl BrickKind {
    /// Glow color (0xRRGGBB), also used for its break particles
    pub fn color(&self) -> u32 {
        match self {
            BrickKind::Standard => 0x00bfff,
            BrickKind::Tough => 0xbf00ff,
        }
    }
}

impl Brick {
    pub fn is_tough(&self) -> bool {
        self.kind == BrickKind::Tough
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    WidenPaddle,
    MultiBall,
    SlowBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::WidenPaddle,
        PowerUpKind::MultiBall,
        PowerUpKind::SlowBall,
    ];

    /// Pickup and flash color (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::WidenPaddle => 0x00ff00,
            PowerUpKind::MultiBall => 0xff0000,
            PowerUpKind::SlowBall => 0x0064ff,
        }
    }
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    /// Center
    pub pos: Vec2,
    pub size: f32,
    pub fall_speed: f32,
}

impl PowerUp {
    pub fn bounds(&self) -> Aabb {
        let half = Vec2::splat(self.size / 2.0);
        Aabb::new(self.pos - half, self.pos + half)
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Remaining lifetime in ticks
    pub life: u32,
    pub size: f32,
}

/// Timed power-up effects, stored as absolute deadlines (ms)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub widen_until: Option<f64>,
    pub slow_until: Option<f64>,
}

impl ActiveEffects {
    pub fn widen_active(&self) -> bool {
        self.widen_until.is_some()
    }

    pub fn slow_active(&self) -> bool {
        self.slow_until.is_some()
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub playfield: Playfield,
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u32,
    /// Current level within the pattern cycle (1-based)
    pub level: u32,
    /// Completed pattern cycles
    pub loops: u32,
    /// Scales launch speed and speed bounds; grows each cycle
    pub difficulty: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Time of the most recent tick (ms)
    pub now_ms: f64,
    /// Set while paused, so deadlines can be shifted on resume
    pub paused_at: Option<f64>,
    pub paddle: Paddle,
    /// Active balls, in spawn order
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub effects: ActiveEffects,
    /// Events emitted since the last drain
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create an idle session. Fails if the tuning or playfield is unusable.
    pub fn new(tuning: Tuning, playfield: Playfield, seed: u64) -> Result<Self, GameError> {
        tuning.validate()?;
        if !playfield.is_usable() {
            return Err(GameError::MissingSurface {
                width: playfield.width,
                height: playfield.height,
            });
        }

        let paddle = Paddle::new(
            playfield,
            tuning.paddle_width,
            tuning.paddle_height,
            tuning.paddle_bottom_margin,
        );
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            lives: tuning.starting_lives,
            tuning,
            playfield,
            phase: GamePhase::Idle,
            score: 0,
            level: 1,
            loops: 0,
            difficulty: 1.0,
            time_ticks: 0,
            now_ms: 0.0,
            paused_at: None,
            paddle,
            balls: Vec::new(),
            bricks: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            effects: ActiveEffects::default(),
            events: Vec::new(),
            next_id: 1,
        };

        state.load_level();
        state.reset_balls();
        Ok(state)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Idle -> Running. Returns false if the session was not idle.
    pub fn start(&mut self, now_ms: f64) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.now_ms = now_ms;
        self.phase = GamePhase::Running;
        log::info!(
            "Session started (seed {}, {} lives, {} bricks)",
            self.seed,
            self.lives,
            self.bricks.len()
        );
        true
    }

    /// End the session explicitly. Idempotent: only the first call emits.
    pub fn stop(&mut self) -> bool {
        if self.phase == GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::GameOver;
        self.paused_at = None;
        self.emit(GameEvent::Stopped {
            final_score: self.score,
        });
        log::info!("Session stopped with score {}", self.score);
        true
    }

    /// Replace this session with a fresh idle one using the same tuning
    pub fn restart(&mut self, seed: u64) {
        let fresh = Self::new(self.tuning.clone(), self.playfield, seed);
        // Tuning and playfield were validated when this session was built
        debug_assert!(fresh.is_ok());
        if let Ok(fresh) = fresh {
            *self = fresh;
            log::info!("Session restarted with seed {}", seed);
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Score to hand to the leaderboard once the game is over
    pub fn final_score(&self) -> Option<u64> {
        self.is_over().then_some(self.score)
    }

    /// Current `[min, max]` ball speed, scaled by difficulty
    pub fn speed_bounds(&self) -> (f32, f32) {
        (
            self.tuning.min_speed * self.difficulty,
            self.tuning.max_speed * self.difficulty,
        )
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Uniform roll in [0, 1)
    pub(crate) fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform roll in [-width/2, width/2)
    pub(crate) fn jitter(&mut self, width: f32) -> f32 {
        (self.roll() - 0.5) * width
    }

    pub(crate) fn random_neon_color(&mut self) -> u32 {
        NEON_COLORS[self.rng.random_range(0..NEON_COLORS.len())]
    }

    /// Where a fresh ball starts
    pub fn launch_position(&self) -> Vec2 {
        Vec2::new(
            self.playfield.width / 2.0,
            self.playfield.height - crate::consts::BALL_LAUNCH_OFFSET - self.tuning.paddle_height,
        )
    }

    /// A fresh upward ball at the launch position. The launch angle is kept at
    /// least `min_launch_angle` away from horizontal.
    pub fn make_launch_ball(&mut self) -> Ball {
        let (min, max) = self.speed_bounds();
        let (lo, hi) = self.tuning.launch_spread;
        let speed = (self.tuning.launch_speed * self.difficulty * self.rng.random_range(lo..=hi))
            .clamp(min, max);

        // Angle measured from straight up
        let max_tilt = std::f32::consts::FRAC_PI_2 - self.tuning.min_launch_angle();
        let tilt = self.rng.random_range(-max_tilt..=max_tilt);
        let vel = Vec2::new(tilt.sin(), -tilt.cos()) * speed;

        let id = self.next_entity_id();
        let color = self.random_neon_color();
        Ball::new(id, self.launch_position(), vel, self.tuning.ball_radius, color)
    }

    /// Replace every ball with exactly one fresh ball
    pub fn reset_balls(&mut self) {
        self.balls.clear();
        let ball = self.make_launch_ball();
        self.balls.push(ball);
    }

    /// Regenerate bricks for the current level
    pub fn load_level(&mut self) {
        let first_id = self.next_id;
        self.bricks = level::generate_level(
            self.level,
            &self.tuning,
            self.playfield,
            &mut self.rng,
            first_id,
        );
        self.next_id += self.bricks.len() as u32;
    }

    /// Spray `count` particles from `pos`
    pub fn burst(&mut self, pos: Vec2, count: u32, color: u32) {
        let speed = self.tuning.particle_speed;
        let life = self.tuning.particle_lifetime;
        for _ in 0..count {
            let vel = Vec2::new(self.jitter(speed * 2.0), self.jitter(speed * 2.0));
            let size = 2.0 + self.roll() * 3.0;
            self.particles.push(Particle {
                pos,
                vel,
                color,
                life,
                size,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Playfield {
        Playfield::new(600.0, 600.0)
    }

    #[test]
    fn test_new_session_is_idle_with_one_ball() {
        let state = GameState::new(Tuning::default(), field(), 7).unwrap();
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.lives, 4);
        assert_eq!(state.level, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.balls.len(), 1);
        assert_eq!(state.bricks.len(), 60);
    }

    #[test]
    fn test_missing_surface_rejected() {
        let result = GameState::new(Tuning::default(), Playfield::new(0.0, 600.0), 7);
        assert!(matches!(result, Err(GameError::MissingSurface { .. })));
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            min_speed: 20.0,
            ..Default::default()
        };
        let result = GameState::new(tuning, field(), 7);
        assert!(matches!(result, Err(GameError::Config(_))));
    }

    #[test]
    fn test_launch_ball_is_upward_and_in_bounds() {
        let mut state = GameState::new(Tuning::default(), field(), 42).unwrap();
        let (min, max) = state.speed_bounds();
        let min_angle = state.tuning.min_launch_angle();
        for _ in 0..200 {
            let ball = state.make_launch_ball();
            let speed = ball.speed();
            assert!(speed >= min - 1e-4 && speed <= max + 1e-4);
            assert!(ball.vel.y < 0.0);
            // Angle above horizontal
            let elevation = (-ball.vel.y).atan2(ball.vel.x.abs());
            assert!(elevation >= min_angle - 1e-4);
        }
    }

    #[test]
    fn test_shallowest_allowed_launch_is_never_horizontal() {
        let tuning = Tuning {
            min_launch_angle_deg: 5.0,
            ..Default::default()
        };
        let mut state = GameState::new(tuning, field(), 43).unwrap();
        for _ in 0..2000 {
            let ball = state.make_launch_ball();
            let elevation = (-ball.vel.y).atan2(ball.vel.x.abs()).to_degrees();
            assert!(elevation >= 5.0 - 1e-3);
        }
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut state = GameState::new(Tuning::default(), field(), 1).unwrap();
        state.start(0.0);
        assert!(state.stop());
        let first = state.drain_events();
        assert!(!state.stop());
        assert!(state.drain_events().is_empty());
        assert_eq!(first.len(), 1);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_paddle_width_change_stays_clamped() {
        let mut paddle = Paddle::new(field(), 100.0, 15.0, 10.0);
        paddle.pos.x = 500.0;
        paddle.set_width(180.0, 600.0);
        assert!(paddle.pos.x >= 0.0);
        assert!(paddle.pos.x <= 600.0 - paddle.width);
    }

    #[test]
    fn test_restart_resets_session() {
        let mut state = GameState::new(Tuning::default(), field(), 3).unwrap();
        state.start(0.0);
        state.score = 1234;
        state.lives = 1;
        state.stop();
        state.restart(4);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 4);
        assert_eq!(state.seed, 4);
    }
}
