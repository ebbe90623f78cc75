//! Shape generation for 2D primitives
//!
//! Everything is emitted as a flat triangle list in playfield coordinates.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors, rgb};
use super::{Frame, TrailView};
use crate::settings::Settings;
use crate::sim::shape::BrickShape;
use crate::sim::state::BrickKind;

/// Interpolate color based on speed (slow=blue, medium=green, fast=red/orange)
fn velocity_color(speed: f32, (min, max): (f32, f32), alpha: f32) -> [f32; 4] {
    let span = (max - min).max(f32::EPSILON);
    let t = ((speed - min) / span).clamp(0.0, 1.0);

    let (r, g, b) = if t < 0.25 {
        let u = t / 0.25;
        (0.2, 0.4 + 0.4 * u, 1.0)
    } else if t < 0.5 {
        let u = (t - 0.25) / 0.25;
        (0.2, 0.8, 1.0 - 0.6 * u)
    } else if t < 0.75 {
        let u = (t - 0.5) / 0.25;
        (0.2 + 0.8 * u, 0.8, 0.4 - 0.2 * u)
    } else {
        let u = (t - 0.75) / 0.25;
        (1.0, 0.8 - 0.5 * u, 0.2)
    };

    [r, g, b, alpha]
}

/// Tapering quad strip behind a ball, tinted by speed
pub fn ball_trail(trail: &[TrailView], ball_radius: f32, speed_range: (f32, f32)) -> Vec<Vertex> {
    if trail.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity((trail.len() - 1) * 6);
    let trail_len = trail.len() as f32;

    for (i, pair) in trail.windows(2).enumerate() {
        let (p1, p2) = (pair[0], pair[1]);

        // Fade alpha and width along the trail
        let t1 = i as f32 / trail_len;
        let t2 = (i + 1) as f32 / trail_len;
        let color1 = velocity_color(p1.speed, speed_range, (1.0 - t1) * 0.6);
        let color2 = velocity_color(p2.speed, speed_range, (1.0 - t2) * 0.6);
        let width1 = ball_radius * (1.0 - t1 * 0.7);
        let width2 = ball_radius * (1.0 - t2 * 0.7);

        let dir = (p2.pos - p1.pos).normalize_or_zero();
        let perp = Vec2::new(-dir.y, dir.x);

        let v1a = p1.pos + perp * width1;
        let v1b = p1.pos - perp * width1;
        let v2a = p2.pos + perp * width2;
        let v2b = p2.pos - perp * width2;

        vertices.push(Vertex::new(v1a.x, v1a.y, color1));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2a.x, v2a.y, color2));

        vertices.push(Vertex::new(v2a.x, v2a.y, color2));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2b.x, v2b.y, color2));
    }

    vertices
}

/// Filled circle as a triangle fan
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Axis-aligned rectangle (two triangles)
pub fn rect(x: f32, y: f32, w: f32, h: f32, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(x, y, color),
        Vertex::new(x + w, y, color),
        Vertex::new(x, y + h, color),
        Vertex::new(x, y + h, color),
        Vertex::new(x + w, y, color),
        Vertex::new(x + w, y + h, color),
    ]
}

/// Convex polygon fanned from its first vertex
pub fn polygon(points: &[Vec2], color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 3 {
        return Vec::new();
    }
    let mut vertices = Vec::with_capacity((points.len() - 2) * 3);
    let anchor = points[0];
    for pair in points[1..].windows(2) {
        vertices.push(Vertex::new(anchor.x, anchor.y, color));
        vertices.push(Vertex::new(pair[0].x, pair[0].y, color));
        vertices.push(Vertex::new(pair[1].x, pair[1].y, color));
    }
    vertices
}

fn brick_shape(shape: &BrickShape, color: [f32; 4]) -> Vec<Vertex> {
    match shape {
        BrickShape::Rect { x, y, w, h } => rect(*x, *y, *w, *h, color),
        BrickShape::Polygon { vertices, .. } => polygon(vertices, color),
    }
}

/// Shrink a brick toward its center (inner band for tough bricks)
fn inset(shape: &BrickShape, amount: f32) -> BrickShape {
    match *shape {
        BrickShape::Rect { x, y, w, h } => {
            let dx = amount.min(w / 2.0);
            let dy = amount.min(h / 2.0);
            BrickShape::rect(x + dx, y + dy, w - 2.0 * dx, h - 2.0 * dy)
        }
        BrickShape::Polygon {
            vertices, centroid, ..
        } => BrickShape::polygon(vertices.map(|v| {
            let to_center = centroid - v;
            v + to_center.normalize_or_zero() * amount.min(to_center.length() * 0.5)
        })),
    }
}

/// Triangles for the whole frame, back to front
pub fn tessellate(frame: &Frame, settings: &Settings) -> Vec<Vertex> {
    let segments = settings.quality.circle_segments();
    let mut out = rect(
        0.0,
        0.0,
        frame.playfield.width,
        frame.playfield.height,
        colors::BACKGROUND,
    );

    for brick in &frame.bricks {
        out.extend(brick_shape(&brick.shape, rgb(brick.color, 1.0)));
        if brick.kind == BrickKind::Tough && brick.hp > 1 {
            out.extend(brick_shape(&inset(&brick.shape, 4.0), colors::TOUGH_CORE));
        }
    }

    for p in &frame.power_ups {
        let half = p.size / 2.0;
        out.extend(rect(p.pos.x - half, p.pos.y - half, p.size, p.size, rgb(p.color, 1.0)));
    }

    let paddle = &frame.paddle;
    out.extend(rect(
        paddle.pos.x,
        paddle.pos.y,
        paddle.width,
        paddle.height,
        colors::PADDLE,
    ));

    for ball in &frame.balls {
        out.extend(ball_trail(&ball.trail, ball.radius, frame.speed_range));
        out.extend(circle(ball.pos, ball.radius, rgb(ball.color, 1.0), segments));
    }

    for p in &frame.particles {
        out.extend(circle(p.pos, p.size / 2.0, rgb(p.color, p.alpha), 6));
    }

    if let Some(color) = frame.flash {
        out.extend(rect(
            0.0,
            0.0,
            frame.playfield.width,
            frame.playfield.height,
            rgb(color, 0.3),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameState, Playfield};
    use crate::tuning::Tuning;

    #[test]
    fn test_circle_vertex_count() {
        let verts = circle(Vec2::ZERO, 5.0, [1.0; 4], 16);
        assert_eq!(verts.len(), 48);
        for v in verts.iter().skip(1).step_by(3) {
            let r = Vec2::from(v.position).length();
            assert!((r - 5.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_polygon_fan() {
        let quad = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
        ];
        assert_eq!(polygon(&quad, [1.0; 4]).len(), 6);
        assert!(polygon(&quad[..2], [1.0; 4]).is_empty());
    }

    #[test]
    fn test_trail_needs_two_points() {
        let point = TrailView {
            pos: Vec2::ZERO,
            speed: 5.0,
        };
        assert!(ball_trail(&[point], 8.0, (5.0, 16.0)).is_empty());
        assert_eq!(ball_trail(&[point, point, point], 8.0, (5.0, 16.0)).len(), 12);
    }

    #[test]
    fn test_velocity_color_endpoints() {
        let slow = velocity_color(5.0, (5.0, 16.0), 1.0);
        let fast = velocity_color(16.0, (5.0, 16.0), 1.0);
        assert!(slow[2] > slow[0]);
        assert!(fast[0] > fast[2]);
    }

    #[test]
    fn test_inset_stays_inside() {
        let shape = BrickShape::rect(0.0, 0.0, 60.0, 20.0);
        let inner = inset(&shape, 4.0).bounds();
        assert_eq!(inner.min, Vec2::new(4.0, 4.0));
        assert_eq!(inner.max, Vec2::new(56.0, 16.0));
    }

    #[test]
    fn test_tessellate_frame() {
        let mut state =
            GameState::new(Tuning::default(), Playfield::new(600.0, 600.0), 5).unwrap();
        state.start(0.0);
        let settings = Settings::default();
        let frame = Frame::capture(&state, &[], &settings);
        let verts = tessellate(&frame, &settings);
        // Background + 60 bricks + paddle + one ball
        let minimum = 6 + 60 * 6 + 6 + 16 * 3;
        assert!(verts.len() >= minimum);
        assert_eq!(verts.len() % 3, 0);
    }
}
