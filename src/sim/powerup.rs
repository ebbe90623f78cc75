//! Power-up engine
//!
//! Drops, collection, and timed effects. Timers are absolute deadlines on
//! [`ActiveEffects`] compared against the tick time; cancelling an effect is
//! clearing its deadline. Re-collecting an active effect restarts its
//! deadline and never stacks magnitude.

use glam::Vec2;
use rand::Rng;

use super::events::{AudioCue, GameEvent};
use super::state::{Ball, GameState, Particle, PowerUp, PowerUpKind, SLOW_BALL_COLOR};
use crate::clamp_speed;

/// Velocity multiplier applied to ball movement this tick
pub fn speed_multiplier(state: &GameState) -> f32 {
    if state.effects.slow_active() {
        state.tuning.slow_multiplier
    } else {
        1.0
    }
}

/// Maybe drop a power-up where a brick was destroyed
pub fn roll_drop(state: &mut GameState, pos: Vec2, tough: bool) {
    let mut chance = state.tuning.drop_chance;
    if tough {
        chance *= state.tuning.tough_drop_multiplier;
    }
    if state.roll() >= chance.min(1.0) {
        return;
    }

    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.next_entity_id();
    state.power_ups.push(PowerUp {
        id,
        kind,
        pos,
        size: state.tuning.power_up_size,
        fall_speed: state.tuning.power_up_fall_speed,
    });
}

/// Advance falling power-ups, collect those touching the paddle and drop
/// those that left the playfield
pub fn update_power_ups(state: &mut GameState) {
    let paddle = state.paddle.bounds();
    let bottom = state.playfield.height;
    let mut collected = Vec::new();

    state.power_ups.retain_mut(|p| {
        p.pos.y += p.fall_speed;
        let bounds = p.bounds();
        if bounds.overlaps(&paddle) {
            collected.push(p.kind);
            false
        } else {
            // Missed pickups vanish without penalty
            bounds.min.y <= bottom
        }
    });

    for kind in collected {
        apply(state, kind);
    }
}

/// Apply a collected power-up
pub fn apply(state: &mut GameState, kind: PowerUpKind) {
    let now = state.now_ms;
    state.score += state.tuning.points_power_up;
    state.emit(GameEvent::Sound(AudioCue::PowerUpCollected));
    state.emit(GameEvent::Flash(kind));
    paddle_burst(state, kind.color());

    match kind {
        PowerUpKind::WidenPaddle => {
            let width = state.paddle.base_width * state.tuning.widen_factor;
            state.paddle.set_width(width, state.playfield.width);
            state.effects.widen_until = Some(now + state.tuning.widen_duration_ms);
        }
        PowerUpKind::MultiBall => spawn_multi_ball(state),
        PowerUpKind::SlowBall => {
            let factor = state.tuning.slow_radius_factor;
            for ball in &mut state.balls {
                ball.radius = ball.base_radius * factor;
                ball.color = SLOW_BALL_COLOR;
            }
            state.effects.slow_until = Some(now + state.tuning.slow_duration_ms);
        }
    }
    log::debug!("Power-up {:?} collected at {:.0}ms", kind, now);
}

/// Particles rising from the paddle top
fn paddle_burst(state: &mut GameState, color: u32) {
    let count = state.tuning.particles_power_up;
    let speed = state.tuning.particle_speed;
    let life = state.tuning.particle_lifetime;
    for _ in 0..count {
        let x = state.paddle.pos.x + state.paddle.width * state.roll();
        let vel = Vec2::new(state.jitter(speed * 2.0), -state.roll() * speed * 2.0);
        let size = 2.0 + state.roll() * 3.0;
        state.particles.push(Particle {
            pos: Vec2::new(x, state.paddle.pos.y),
            vel,
            color,
            life,
            size,
        });
    }
}

/// Burst of up to two extra balls from the first live ball, never exceeding
/// the ball cap
fn spawn_multi_ball(state: &mut GameState) {
    let cap = state.tuning.multi_ball_cap;
    if state.balls.len() >= cap {
        log::debug!("Multi-ball ignored: {} balls already in play", state.balls.len());
        return;
    }
    let Some(source) = state.balls.iter().find(|b| !b.lost).cloned() else {
        return;
    };

    let (min, max) = state.speed_bounds();
    let v = source.vel;
    // Mirrored and perpendicular headings
    let headings = [Vec2::new(-v.x * 1.1, v.y), Vec2::new(v.y * 0.8, -v.x * 0.8)];
    let slow = state.effects.slow_active();

    for heading in headings.into_iter().take(cap - state.balls.len()) {
        let id = state.next_entity_id();
        let color = if slow {
            SLOW_BALL_COLOR
        } else {
            state.random_neon_color()
        };
        let mut ball = Ball::new(
            id,
            source.pos,
            clamp_speed(heading, min, max),
            source.base_radius,
            color,
        );
        ball.radius = source.radius;
        state.balls.push(ball);
    }
}

/// End effects whose deadline has passed
pub fn expire_effects(state: &mut GameState) {
    let now = state.now_ms;
    if state.effects.widen_until.is_some_and(|t| t <= now) {
        end_widen(state);
        log::debug!("Widen paddle expired at {:.0}ms", now);
    }
    if state.effects.slow_until.is_some_and(|t| t <= now) {
        end_slow(state);
        log::debug!("Slow ball expired at {:.0}ms", now);
    }
}

/// Cancel every timed effect (life lost, level change)
pub fn clear_effects(state: &mut GameState) {
    end_widen(state);
    if state.effects.slow_active() {
        end_slow(state);
    }
}

fn end_widen(state: &mut GameState) {
    state.effects.widen_until = None;
    let base = state.paddle.base_width;
    state.paddle.set_width(base, state.playfield.width);
}

fn end_slow(state: &mut GameState) {
    state.effects.slow_until = None;
    for i in 0..state.balls.len() {
        let color = state.random_neon_color();
        let ball = &mut state.balls[i];
        ball.radius = ball.base_radius;
        ball.color = color;
    }
}

/// Push every deadline back by `delta_ms` (time spent paused)
pub fn shift_deadlines(state: &mut GameState, delta_ms: f64) {
    if let Some(t) = state.effects.widen_until.as_mut() {
        *t += delta_ms;
    }
    if let Some(t) = state.effects.slow_until.as_mut() {
        *t += delta_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Playfield;
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let mut state = GameState::new(Tuning::default(), Playfield::new(600.0, 600.0), 21).unwrap();
        state.start(0.0);
        state
    }

    #[test]
    fn test_widen_applies_and_expires() {
        let mut state = running_state();
        let base = state.paddle.base_width;
        state.now_ms = 1_000.0;
        apply(&mut state, PowerUpKind::WidenPaddle);
        assert!((state.paddle.width - base * 1.8).abs() < 1e-4);
        assert_eq!(state.score, 100);

        state.now_ms = 12_999.0;
        expire_effects(&mut state);
        assert!(state.effects.widen_active());

        state.now_ms = 13_000.0;
        expire_effects(&mut state);
        assert!(!state.effects.widen_active());
        assert_eq!(state.paddle.width, base);
    }

    #[test]
    fn test_recollect_restarts_countdown_without_stacking() {
        let mut state = running_state();
        let base = state.paddle.base_width;
        state.now_ms = 0.0;
        apply(&mut state, PowerUpKind::WidenPaddle);
        state.now_ms = 10_000.0;
        apply(&mut state, PowerUpKind::WidenPaddle);

        assert!((state.paddle.width - base * 1.8).abs() < 1e-4);
        assert_eq!(state.effects.widen_until, Some(22_000.0));

        // First deadline passes, effect still active
        state.now_ms = 12_500.0;
        expire_effects(&mut state);
        assert!(state.effects.widen_active());
    }

    #[test]
    fn test_slow_enlarges_and_restores_balls() {
        let mut state = running_state();
        let base = state.balls[0].base_radius;
        apply(&mut state, PowerUpKind::SlowBall);
        assert!((state.balls[0].radius - base * 1.4).abs() < 1e-4);
        assert_eq!(state.balls[0].color, SLOW_BALL_COLOR);
        assert_eq!(speed_multiplier(&state), 0.8);

        // Re-collection keeps the same enlargement
        apply(&mut state, PowerUpKind::SlowBall);
        assert!((state.balls[0].radius - base * 1.4).abs() < 1e-4);

        state.now_ms = 8_000.0;
        expire_effects(&mut state);
        assert_eq!(state.balls[0].radius, base);
        assert_eq!(speed_multiplier(&state), 1.0);
    }

    #[test]
    fn test_multi_ball_respects_cap() {
        let mut state = running_state();
        apply(&mut state, PowerUpKind::MultiBall);
        assert_eq!(state.balls.len(), 3);

        let (min, max) = state.speed_bounds();
        for ball in &state.balls {
            let speed = ball.speed();
            assert!(speed >= min - 1e-4 && speed <= max + 1e-4);
        }

        // Cap reached: no-op
        apply(&mut state, PowerUpKind::MultiBall);
        assert_eq!(state.balls.len(), 3);
    }

    #[test]
    fn test_multi_ball_headings_mirror_and_turn() {
        let mut state = running_state();
        state.balls[0].pos = Vec2::new(200.0, 300.0);
        state.balls[0].vel = Vec2::new(6.0, -8.0);
        apply(&mut state, PowerUpKind::MultiBall);

        let mirrored = &state.balls[1];
        let turned = &state.balls[2];
        assert_eq!(mirrored.pos, Vec2::new(200.0, 300.0));
        assert_eq!(turned.pos, Vec2::new(200.0, 300.0));
        // Horizontal component mirrored, vertical kept
        assert!((mirrored.vel - Vec2::new(-6.6, -8.0)).length() < 1e-4);
        // Perpendicular to the source heading
        assert!((turned.vel - Vec2::new(-6.4, -4.8)).length() < 1e-4);
        assert!(turned.vel.dot(state.balls[0].vel).abs() < 1e-3);
    }

    #[test]
    fn test_multi_ball_fills_only_to_cap() {
        let mut state = running_state();
        let extra = state.make_launch_ball();
        state.balls.push(extra);
        apply(&mut state, PowerUpKind::MultiBall);
        assert_eq!(state.balls.len(), 3);
    }

    #[test]
    fn test_clear_effects_restores_everything() {
        let mut state = running_state();
        apply(&mut state, PowerUpKind::WidenPaddle);
        apply(&mut state, PowerUpKind::SlowBall);
        clear_effects(&mut state);
        assert_eq!(state.effects, Default::default());
        assert_eq!(state.paddle.width, state.paddle.base_width);
        assert_eq!(state.balls[0].radius, state.balls[0].base_radius);
    }

    #[test]
    fn test_collect_and_miss() {
        let mut state = running_state();
        let paddle_top = state.paddle.pos.y;
        let center = state.paddle.center_x();
        state.power_ups.push(PowerUp {
            id: 900,
            kind: PowerUpKind::WidenPaddle,
            pos: Vec2::new(center, paddle_top - 11.0),
            size: 20.0,
            fall_speed: 3.0,
        });
        state.power_ups.push(PowerUp {
            id: 901,
            kind: PowerUpKind::MultiBall,
            pos: Vec2::new(5.0, 609.0),
            size: 20.0,
            fall_speed: 3.0,
        });
        update_power_ups(&mut state);
        assert!(state.power_ups.is_empty());
        assert_eq!(state.score, 100);
        assert!(state.effects.widen_active());
        assert_eq!(state.balls.len(), 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Sound(AudioCue::PowerUpCollected)));
        assert!(events.contains(&GameEvent::Flash(PowerUpKind::WidenPaddle)));
    }

    #[test]
    fn test_shift_deadlines() {
        let mut state = running_state();
        apply(&mut state, PowerUpKind::SlowBall);
        shift_deadlines(&mut state, 500.0);
        assert_eq!(state.effects.slow_until, Some(8_500.0));
    }

    #[test]
    fn test_drop_roll_certain_and_never() {
        let mut state = running_state();
        state.tuning.drop_chance = 1.0;
        roll_drop(&mut state, Vec2::new(100.0, 100.0), false);
        assert_eq!(state.power_ups.len(), 1);

        state.tuning.drop_chance = 0.0;
        roll_drop(&mut state, Vec2::new(100.0, 100.0), true);
        assert_eq!(state.power_ups.len(), 1);
    }
}
