//! Per-frame simulation tick
//!
//! One call advances the session by exactly one frame. The order is fixed:
//! paddle, balls (walls and paddle), ball loss, bricks, particles, power-ups,
//! level clear, game over. Entities are only removed by filtering after the
//! pass that marked them.

use glam::Vec2;

use super::collision::{ball_brick_collision, ball_rect_collision, bounce_dominant_axis};
use super::events::{AudioCue, GameEvent};
use super::powerup;
use super::state::{GamePhase, GameState};
use crate::{clamp_speed, rotate};
use crate::consts::PATTERN_COUNT;

/// Paddle intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PaddleIntent {
    /// No key held: paddle stops
    #[default]
    Hold,
    Left,
    Right,
    /// Absolute pointer position (paddle center follows it)
    PointerX(f32),
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub paddle: PaddleIntent,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one frame at time `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: f64) {
    if input.pause {
        toggle_pause(state, now_ms);
    }
    if state.phase != GamePhase::Running {
        return;
    }

    state.now_ms = now_ms;
    state.time_ticks += 1;

    // 1. Paddle
    update_paddle(state, input.paddle);

    // 2. Balls: movement, walls, paddle, falling out
    update_balls(state);

    // 3. Ball loss
    handle_ball_loss(state);
    if state.phase == GamePhase::GameOver {
        return;
    }

    // 4. Bricks
    resolve_bricks(state);

    // 5. Particles
    update_particles(state);

    // 6. Power-ups: timed effects, then pickups
    powerup::expire_effects(state);
    powerup::update_power_ups(state);

    // 7. Level clear
    if state.bricks.is_empty() {
        level_up(state);
    }

    // 8. Game over
    if state.lives == 0 {
        game_over(state);
    }
}

fn toggle_pause(state: &mut GameState, now_ms: f64) {
    match state.phase {
        GamePhase::Running => {
            state.phase = GamePhase::Paused;
            state.paused_at = Some(now_ms);
        }
        GamePhase::Paused => {
            // Effects must not run out while the game is paused
            if let Some(since) = state.paused_at.take() {
                powerup::shift_deadlines(state, (now_ms - since).max(0.0));
            }
            state.phase = GamePhase::Running;
        }
        _ => {}
    }
}

fn update_paddle(state: &mut GameState, intent: PaddleIntent) {
    let speed = state.tuning.paddle_speed;
    let paddle = &mut state.paddle;
    match intent {
        PaddleIntent::Hold => paddle.vel_x = 0.0,
        PaddleIntent::Left => paddle.vel_x = -speed,
        PaddleIntent::Right => paddle.vel_x = speed,
        PaddleIntent::PointerX(x) => {
            paddle.vel_x = 0.0;
            paddle.pos.x = x - paddle.width / 2.0;
        }
    }
    paddle.pos.x += paddle.vel_x;
    paddle.clamp_to(state.playfield.width);
    debug_assert!(paddle.pos.x >= 0.0);
}

/// Rotate a near-horizontal velocity toward vertical, keeping its speed and
/// its horizontal direction. A zero vertical component turns downward.
pub(crate) fn anti_stall(vel: Vec2, rotation: f32) -> Vec2 {
    let sx = if vel.x < 0.0 { -1.0 } else { 1.0 };
    let sy = if vel.y < 0.0 { -1.0 } else { 1.0 };
    rotate(vel, rotation * sx * sy)
}

fn update_balls(state: &mut GameState) {
    let (min, max) = state.speed_bounds();
    let multiplier = powerup::speed_multiplier(state);
    let width = state.playfield.width;
    let height = state.playfield.height;
    let stall_threshold = state.tuning.stall_threshold;
    let stall_rotation = state.tuning.stall_rotation_deg.to_radians();
    let max_angle = state.tuning.max_paddle_angle();
    let paddle_jitter = state.tuning.paddle_jitter;
    let paddle = state.paddle.bounds();
    let paddle_center = state.paddle.center_x();
    let half_width = state.paddle.width / 2.0;

    let mut cues = Vec::new();

    for i in 0..state.balls.len() {
        // Rolled up front so the ball can be borrowed mutably below
        let nudge = state.jitter(paddle_jitter);
        let ball = &mut state.balls[i];
        let r = ball.radius;

        ball.vel = clamp_speed(ball.vel, min, max);
        let prev = ball.pos;
        ball.pos += ball.vel * multiplier;

        // Walls
        let mut side_bounce = false;
        if ball.pos.x - r < 0.0 {
            ball.pos.x = r;
            ball.vel.x = ball.vel.x.abs();
            side_bounce = true;
        } else if ball.pos.x + r > width {
            ball.pos.x = width - r;
            ball.vel.x = -ball.vel.x.abs();
            side_bounce = true;
        }
        if side_bounce {
            if ball.vel.y.abs() < stall_threshold {
                ball.vel = anti_stall(ball.vel, stall_rotation);
            }
            cues.push(AudioCue::WallHit);
        }
        if ball.pos.y - r < 0.0 {
            ball.pos.y = r;
            ball.vel.y = ball.vel.y.abs();
            cues.push(AudioCue::WallHit);
        }

        // Paddle: overlap, or a fast ball crossing the paddle top this tick.
        // Only a ball arriving from above is returned; one already past the
        // top face keeps falling even if it grazes the side or underside.
        if ball.vel.y > 0.0 && prev.y <= paddle.min.y {
            let overlapping = ball_rect_collision(ball.pos, r, &paddle).hit;
            let crossed = {
                let before = prev.y + r;
                let after = ball.pos.y + r;
                if before <= paddle.min.y && after >= paddle.min.y && after > before {
                    let t = (paddle.min.y - before) / (after - before);
                    let x = prev.x + (ball.pos.x - prev.x) * t;
                    x >= paddle.min.x - r && x <= paddle.max.x + r
                } else {
                    false
                }
            };

            if overlapping || crossed {
                let offset = ((ball.pos.x - paddle_center) / half_width).clamp(-1.0, 1.0);
                let angle = offset * max_angle;
                let speed = ball.vel.length();
                let mut vel = Vec2::new(angle.sin() * speed, -angle.cos() * speed);
                vel.x += nudge;
                ball.vel = clamp_speed(vel, min, max);
                ball.pos.y = paddle.min.y - r;
                debug_assert!(ball.vel.y < 0.0);
                cues.push(AudioCue::PaddleHit);
            }
        }

        if ball.pos.y - r > height {
            ball.lost = true;
        }

        ball.record_trail();
    }

    for cue in cues {
        state.emit(GameEvent::Sound(cue));
    }
}

fn handle_ball_loss(state: &mut GameState) {
    let lost = state.balls.iter().filter(|b| b.lost).count();
    if lost == 0 {
        return;
    }

    if lost < state.balls.len() {
        // Multi-ball: the others keep playing
        state.balls.retain(|b| !b.lost);
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    powerup::clear_effects(state);
    state.emit(GameEvent::Sound(AudioCue::LifeLost));
    state.emit(GameEvent::LifeLost {
        lives_left: state.lives,
    });
    log::debug!("Life lost, {} remaining", state.lives);

    if state.lives > 0 {
        state.reset_balls();
    } else {
        state.balls.clear();
        game_over(state);
    }
}

fn resolve_bricks(state: &mut GameState) {
    let (min, max) = state.speed_bounds();
    let jitter = state.tuning.brick_jitter;

    for bi in 0..state.bricks.len() {
        for ball_i in 0..state.balls.len() {
            if state.bricks[bi].hp == 0 {
                break;
            }
            let ball = &state.balls[ball_i];
            if ball.lost {
                continue;
            }
            let brick = &state.bricks[bi];
            // Broad phase
            if !brick.shape.bounds().overlaps_circle(ball.pos, ball.radius) {
                continue;
            }
            let result = ball_brick_collision(ball.pos, ball.radius, &brick.shape);
            if !result.hit {
                continue;
            }

            let nudge = Vec2::new(state.jitter(jitter), state.jitter(jitter));
            let ball = &mut state.balls[ball_i];
            // Nudge first, then reflect, so the reflected axis keeps leaving the brick
            let vel = bounce_dominant_axis(ball.vel + nudge, result.normal);
            ball.vel = clamp_speed(vel, min, max);
            ball.pos += result.normal * result.penetration;

            let brick = &mut state.bricks[bi];
            brick.hp = brick.hp.saturating_sub(1);
            let destroyed = brick.hp == 0;
            let kind = brick.kind;
            let center = brick.shape.center();
            state.emit(GameEvent::Sound(AudioCue::BrickHit));

            if destroyed {
                let tough = state.bricks[bi].is_tough();
                let (points, particles) = if tough {
                    (state.tuning.points_tough, state.tuning.particles_tough)
                } else {
                    (state.tuning.points_standard, state.tuning.particles_standard)
                };
                state.score += points;
                state.burst(center, particles, kind.color());
                powerup::roll_drop(state, center, tough);
                state.emit(GameEvent::BrickDestroyed { tough, points });
            }
        }
    }

    state.bricks.retain(|b| b.hp > 0);
}

fn update_particles(state: &mut GameState) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}

/// Level cleared: bonus, next pattern, one fresh ball, no power-ups
fn level_up(state: &mut GameState) {
    let bonus = state.tuning.points_level_clear;
    state.score += bonus;
    state.level += 1;

    if state.level > PATTERN_COUNT {
        state.level = 1;
        state.loops += 1;
        state.difficulty = (state.difficulty + state.tuning.difficulty_step)
            .min(state.tuning.difficulty_max);
    }

    state.power_ups.clear();
    powerup::clear_effects(state);
    state.load_level();
    state.reset_balls();

    state.emit(GameEvent::Sound(AudioCue::LevelUp));
    state.emit(GameEvent::LevelCleared {
        bonus,
        next_level: state.level,
        loops: state.loops,
    });
    log::info!(
        "Level cleared: now level {} (cycle {}, difficulty {:.1}), score {}",
        state.level,
        state.loops,
        state.difficulty,
        state.score
    );
}

fn game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.emit(GameEvent::Sound(AudioCue::GameOver));
    state.emit(GameEvent::GameOver {
        final_score: state.score,
    });
    log::info!("Game over with score {} on level {}", state.score, state.level);
}
