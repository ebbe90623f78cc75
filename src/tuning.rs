//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a session can be
//! rebalanced from JSON without touching code. Missing fields fall back to the
//! defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::level::LevelTheme;

/// Gameplay configuration for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    pub starting_lives: u32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Keyboard speed, pixels per tick
    pub paddle_speed: f32,
    pub paddle_bottom_margin: f32,
    /// Outgoing angle from vertical at the paddle edge (degrees)
    pub max_paddle_angle_deg: f32,
    /// Total width of the random dx nudge applied on paddle bounces
    pub paddle_jitter: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub launch_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Launch speed is rolled in `[launch_speed * lo, launch_speed * hi]`
    pub launch_spread: (f32, f32),
    /// Launch angles closer than this to horizontal are rejected (degrees)
    pub min_launch_angle_deg: f32,
    /// Total width of the random nudge applied to both axes on brick bounces
    pub brick_jitter: f32,
    /// Vertical speed below which a side-wall bounce triggers the anti-stall turn
    pub stall_threshold: f32,
    pub stall_rotation_deg: f32,

    // === Bricks / levels ===
    pub brick_rows: u32,
    pub brick_cols: u32,
    pub brick_height: f32,
    pub brick_top_offset: f32,
    pub tough_chance_per_level: f32,
    pub tough_scale: f32,
    pub irregular_bricks: bool,
    /// Interior vertex jitter as a fraction of the smaller cell dimension
    pub vertex_jitter: f32,
    pub theme: LevelTheme,

    // === Scoring ===
    pub points_standard: u64,
    pub points_tough: u64,
    pub points_power_up: u64,
    pub points_level_clear: u64,

    // === Power-ups ===
    pub drop_chance: f32,
    pub tough_drop_multiplier: f32,
    pub power_up_size: f32,
    pub power_up_fall_speed: f32,
    pub widen_factor: f32,
    pub widen_duration_ms: f64,
    pub slow_multiplier: f32,
    pub slow_radius_factor: f32,
    pub slow_duration_ms: f64,
    pub multi_ball_cap: usize,

    // === Particles ===
    pub particle_lifetime: u32,
    pub particle_speed: f32,
    pub particles_standard: u32,
    pub particles_tough: u32,
    pub particles_power_up: u32,

    // === Difficulty cycling ===
    /// Added to the difficulty scalar each time the pattern cycle wraps
    pub difficulty_step: f32,
    pub difficulty_max: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: STARTING_LIVES,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_speed: PADDLE_SPEED,
            paddle_bottom_margin: PADDLE_BOTTOM_MARGIN,
            max_paddle_angle_deg: 60.0,
            paddle_jitter: 0.5,

            ball_radius: BALL_RADIUS,
            launch_speed: BALL_LAUNCH_SPEED,
            min_speed: BALL_MIN_SPEED,
            max_speed: BALL_MAX_SPEED,
            launch_spread: (0.9, 1.2),
            min_launch_angle_deg: 30.0,
            brick_jitter: 0.5,
            stall_threshold: 0.75,
            stall_rotation_deg: 10.0,

            brick_rows: BRICK_ROWS,
            brick_cols: BRICK_COLS,
            brick_height: BRICK_HEIGHT,
            brick_top_offset: BRICK_TOP_OFFSET,
            tough_chance_per_level: 0.2,
            tough_scale: 1.0,
            irregular_bricks: false,
            vertex_jitter: 0.2,
            theme: LevelTheme::Classic,

            points_standard: POINTS_STANDARD,
            points_tough: POINTS_TOUGH,
            points_power_up: POINTS_POWER_UP,
            points_level_clear: POINTS_LEVEL_CLEAR,

            drop_chance: 0.15,
            tough_drop_multiplier: 1.5,
            power_up_size: 20.0,
            power_up_fall_speed: 3.0,
            widen_factor: 1.8,
            widen_duration_ms: 12_000.0,
            slow_multiplier: 0.8,
            slow_radius_factor: 1.4,
            slow_duration_ms: 8_000.0,
            multi_ball_cap: 3,

            particle_lifetime: 30,
            particle_speed: 3.0,
            particles_standard: 15,
            particles_tough: 25,
            particles_power_up: 30,

            difficulty_step: 0.2,
            difficulty_max: 2.0,
        }
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // NaN fails both comparisons, so it is rejected too
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::ValueOutOfRange {
            field,
            min,
            max,
            value,
        })
    }
}

impl Tuning {
    /// Parse tuning from JSON (missing fields use defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("starting_lives", self.starting_lives as f32, 1.0, 99.0)?;
        check_range("paddle_width", self.paddle_width, 1.0, 10_000.0)?;
        check_range("paddle_height", self.paddle_height, 1.0, 1_000.0)?;
        check_range("paddle_speed", self.paddle_speed, 0.0, 1_000.0)?;
        check_range("paddle_bottom_margin", self.paddle_bottom_margin, 0.0, 1_000.0)?;
        check_range("max_paddle_angle_deg", self.max_paddle_angle_deg, 1.0, 85.0)?;
        check_range("paddle_jitter", self.paddle_jitter, 0.0, 5.0)?;
        check_range("ball_radius", self.ball_radius, 0.5, 500.0)?;
        check_range("min_speed", self.min_speed, 0.01, 1_000.0)?;
        if self.min_speed >= self.max_speed {
            return Err(ConfigError::SpeedBounds {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        check_range("launch_speed", self.launch_speed, self.min_speed, self.max_speed)?;
        check_range("launch_spread.1", self.launch_spread.1, 0.1, 10.0)?;
        check_range("launch_spread.0", self.launch_spread.0, 0.1, self.launch_spread.1)?;
        check_range("min_launch_angle_deg", self.min_launch_angle_deg, 5.0, 80.0)?;
        check_range("brick_jitter", self.brick_jitter, 0.0, 5.0)?;
        check_range("stall_threshold", self.stall_threshold, 0.0, 10.0)?;
        check_range("stall_rotation_deg", self.stall_rotation_deg, 0.0, 45.0)?;
        if self.brick_rows == 0 || self.brick_cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.brick_rows,
                cols: self.brick_cols,
            });
        }
        check_range("brick_height", self.brick_height, 1.0, 1_000.0)?;
        check_range("brick_top_offset", self.brick_top_offset, 0.0, 10_000.0)?;
        check_range("tough_chance_per_level", self.tough_chance_per_level, 0.0, 1.0)?;
        check_range("tough_scale", self.tough_scale, 0.0, 10.0)?;
        check_range("vertex_jitter", self.vertex_jitter, 0.0, 0.45)?;
        check_range("drop_chance", self.drop_chance, 0.0, 1.0)?;
        check_range("tough_drop_multiplier", self.tough_drop_multiplier, 0.0, 10.0)?;
        check_range("power_up_size", self.power_up_size, 1.0, 500.0)?;
        check_range("power_up_fall_speed", self.power_up_fall_speed, 0.01, 1_000.0)?;
        check_range("widen_factor", self.widen_factor, 1.0, 5.0)?;
        check_range("widen_duration_ms", self.widen_duration_ms as f32, 0.0, 600_000.0)?;
        check_range("slow_multiplier", self.slow_multiplier, 0.05, 1.0)?;
        check_range("slow_radius_factor", self.slow_radius_factor, 1.0, 5.0)?;
        check_range("slow_duration_ms", self.slow_duration_ms as f32, 0.0, 600_000.0)?;
        check_range("multi_ball_cap", self.multi_ball_cap as f32, 1.0, 64.0)?;
        check_range("particle_speed", self.particle_speed, 0.0, 1_000.0)?;
        check_range("difficulty_step", self.difficulty_step, 0.0, 10.0)?;
        check_range("difficulty_max", self.difficulty_max, 1.0, 10.0)?;
        Ok(())
    }

    /// Maximum paddle deflection angle in radians
    pub fn max_paddle_angle(&self) -> f32 {
        self.max_paddle_angle_deg.to_radians()
    }

    /// Minimum launch deviation from horizontal in radians
    pub fn min_launch_angle(&self) -> f32 {
        self.min_launch_angle_deg.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 2, "widen_factor": 1.5 }"#).unwrap();
        assert_eq!(tuning.starting_lives, 2);
        assert_eq!(tuning.widen_factor, 1.5);
        assert_eq!(tuning.brick_cols, BRICK_COLS);
    }

    #[test]
    fn test_inverted_speed_bounds_rejected() {
        let tuning = Tuning {
            min_speed: 12.0,
            max_speed: 8.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::SpeedBounds { .. })
        ));
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let tuning = Tuning {
            slow_multiplier: 1.5,
            ..Default::default()
        };
        match tuning.validate() {
            Err(ConfigError::ValueOutOfRange { field, .. }) => {
                assert_eq!(field, "slow_multiplier")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_near_horizontal_launch_rejected() {
        let tuning = Tuning {
            min_launch_angle_deg: 0.0,
            ..Default::default()
        };
        match tuning.validate() {
            Err(ConfigError::ValueOutOfRange { field, .. }) => {
                assert_eq!(field, "min_launch_angle_deg")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_jitter_rejected() {
        for tuning in [
            Tuning {
                paddle_jitter: f32::NAN,
                ..Default::default()
            },
            Tuning {
                brick_jitter: f32::INFINITY,
                ..Default::default()
            },
            Tuning {
                stall_threshold: f32::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                tuning.validate(),
                Err(ConfigError::ValueOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_empty_grid_rejected() {
        let tuning = Tuning {
            brick_rows: 0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
