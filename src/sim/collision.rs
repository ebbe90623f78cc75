//! Collision detection and response for rectangles and quadrilaterals
//!
//! Every function here is pure: it reads positions and shapes and reports
//! what it found. Response (reflection, damage) is applied by the tick.

use glam::Vec2;

use super::shape::{Aabb, BrickShape};

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit surface normal pointing from the shape toward the ball
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

#[inline]
fn side(d: f32) -> f32 {
    if d < 0.0 { -1.0 } else { 1.0 }
}

/// Crossing-number test over an ordered vertex ring
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Closest point to `p` on segment `ab` (projection parameter clamped to [0, 1])
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-8 {
        return a; // Degenerate segment
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `ab`
pub fn distance_point_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    (p - closest_point_on_segment(p, a, b)).length()
}

/// Circle vs axis-aligned rectangle
///
/// The penetrated side is chosen by comparing overlap depth on each axis;
/// equal overlaps resolve as a top/bottom hit.
pub fn ball_rect_collision(center: Vec2, radius: f32, rect: &Aabb) -> CollisionResult {
    if !rect.overlaps_circle(center, radius) {
        return CollisionResult::miss();
    }

    // Precise test: rejects the corner regions the bounding square lets through
    let closest = rect.closest_point(center);
    if (center - closest).length_squared() > radius * radius {
        return CollisionResult::miss();
    }

    let overlap_x = (center.x + radius - rect.min.x).min(rect.max.x - (center.x - radius));
    let overlap_y = (center.y + radius - rect.min.y).min(rect.max.y - (center.y - radius));
    let rect_center = rect.center();

    let (normal, penetration) = if overlap_x < overlap_y {
        (Vec2::new(side(center.x - rect_center.x), 0.0), overlap_x)
    } else {
        (Vec2::new(0.0, side(center.y - rect_center.y)), overlap_y)
    };

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Circle vs convex polygon
///
/// Hit when the circle center lies inside the ring or within `radius` of any
/// edge. The normal is the outward normal of the nearest edge.
pub fn ball_polygon_collision(
    center: Vec2,
    radius: f32,
    vertices: &[Vec2],
    bounds: &Aabb,
    centroid: Vec2,
) -> CollisionResult {
    if vertices.len() < 3 || !bounds.overlaps_circle(center, radius) {
        return CollisionResult::miss();
    }

    let inside = point_in_polygon(center, vertices);

    let mut best_dist = f32::INFINITY;
    let mut best_edge = (vertices[0], vertices[1]);
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let closest = closest_point_on_segment(center, a, b);
        let dist = (center - closest).length();
        if dist < best_dist {
            best_dist = dist;
            best_edge = (a, b);
        }
    }

    if !inside && best_dist >= radius {
        return CollisionResult::miss();
    }

    let (a, b) = best_edge;
    let edge = b - a;
    let mut normal = Vec2::new(edge.y, -edge.x).normalize_or_zero();
    // Orient away from the polygon interior
    if normal.dot((a + b) * 0.5 - centroid) < 0.0 {
        normal = -normal;
    }

    let penetration = if inside {
        radius + best_dist
    } else {
        radius - best_dist
    };

    CollisionResult {
        hit: true,
        normal,
        penetration,
    }
}

/// Circle vs brick, dispatching on the shape variant
pub fn ball_brick_collision(center: Vec2, radius: f32, shape: &BrickShape) -> CollisionResult {
    match shape {
        BrickShape::Rect { .. } => ball_rect_collision(center, radius, &shape.bounds()),
        BrickShape::Polygon {
            vertices,
            bounds,
            centroid,
        } => ball_polygon_collision(center, radius, vertices, bounds, *centroid),
    }
}

/// Flip the velocity component on the normal's dominant axis so it points
/// along the normal. Ties go to the vertical axis.
pub fn bounce_dominant_axis(velocity: Vec2, normal: Vec2) -> Vec2 {
    if normal.x.abs() > normal.y.abs() {
        Vec2::new(velocity.x.abs() * side(normal.x), velocity.y)
    } else {
        Vec2::new(velocity.x, velocity.y.abs() * side(normal.y))
    }
}
