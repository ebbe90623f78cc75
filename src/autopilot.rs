//! Attract-mode autopilot
//!
//! An [`InputSource`] that plays by itself: it steers under the most
//! dangerous ball, and when every ball is safely on its way up it goes for
//! the nearest falling power-up.

use crate::game::InputSource;
use crate::sim::state::{Ball, GameState};
use crate::sim::tick::{PaddleIntent, TickInput};

/// Balls further than this above the paddle and rising are no threat
const SAFE_HEIGHT: f32 = 200.0;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Ticks driven so far (feeds the aim wobble)
    ticks: u64,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fold `x` back into `[lo, hi]` as if reflected off both walls
pub(crate) fn fold_into(x: f32, lo: f32, hi: f32) -> f32 {
    let span = hi - lo;
    if span <= 0.0 {
        return lo;
    }
    let u = (x - lo).rem_euclid(2.0 * span);
    lo + if u > span { 2.0 * span - u } else { u }
}

/// Where a ball will cross the paddle top, ignoring bricks
pub(crate) fn predict_landing_x(ball: &Ball, paddle_top: f32, width: f32) -> f32 {
    if ball.vel.y <= 0.0 {
        return ball.pos.x;
    }
    let ticks = ((paddle_top - ball.radius - ball.pos.y) / ball.vel.y).max(0.0);
    let x = ball.pos.x + ball.vel.x * ticks;
    fold_into(x, ball.radius, width - ball.radius)
}

/// The ball that will reach the paddle soonest; rising balls count as
/// far away
fn most_dangerous(state: &GameState) -> Option<&Ball> {
    let paddle_top = state.paddle.pos.y;
    let eta = |b: &Ball| {
        if b.vel.y > 0.0 {
            (paddle_top - b.pos.y) / b.vel.y
        } else {
            f32::MAX - b.pos.y
        }
    };
    state
        .balls
        .iter()
        .min_by(|a, b| eta(a).partial_cmp(&eta(b)).unwrap_or(std::cmp::Ordering::Equal))
}

impl InputSource for Autopilot {
    fn poll(&mut self, state: &GameState) -> TickInput {
        self.ticks += 1;
        let paddle = &state.paddle;
        let paddle_top = paddle.pos.y;
        let width = state.playfield.width;

        let all_safe = state
            .balls
            .iter()
            .all(|b| b.vel.y < 0.0 && b.pos.y < paddle_top - SAFE_HEIGHT);

        let pickup = if all_safe {
            state.power_ups.iter().min_by(|a, b| {
                let da = a.pos.distance(paddle.bounds().center());
                let db = b.pos.distance(paddle.bounds().center());
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
        } else {
            None
        };

        let target = if let Some(p) = pickup {
            Some(p.pos.x)
        } else {
            most_dangerous(state).map(|ball| {
                // Wobble around the landing point so rallies vary their angle
                let t = self.ticks as f32 * 0.01;
                let wobble = (t.sin() * 0.3 + (t * 0.7).sin() * 0.15) * paddle.width * 0.5;
                predict_landing_x(ball, paddle_top, width) + wobble
            })
        };

        let paddle_intent = match target {
            Some(x) => {
                let dx = x - paddle.center_x();
                let dead_zone = state.tuning.paddle_speed * 0.5;
                if dx < -dead_zone {
                    PaddleIntent::Left
                } else if dx > dead_zone {
                    PaddleIntent::Right
                } else {
                    PaddleIntent::Hold
                }
            }
            None => PaddleIntent::Hold,
        };

        TickInput {
            paddle: paddle_intent,
            pause: false,
        }
    }
}
