//! Brick geometry
//!
//! A brick is either an axis-aligned rectangle or an irregular quadrilateral
//! cut from a jittered vertex grid. Polygons carry a precomputed bounding box
//! and centroid so broad-phase rejection never touches the vertex ring.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in playfield coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
        }
    }

    /// Smallest box containing every point
    pub fn from_points(points: &[Vec2]) -> Self {
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for &p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Broad-phase test against a circle's bounding square
    #[inline]
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x + radius > self.min.x
            && center.x - radius < self.max.x
            && center.y + radius > self.min.y
            && center.y - radius < self.max.y
    }

    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Closest point inside the box to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }
}

/// Shape of a brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrickShape {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    },
    /// Quadrilateral, vertices in ring order
    Polygon {
        vertices: [Vec2; 4],
        bounds: Aabb,
        centroid: Vec2,
    },
}

impl BrickShape {
    pub fn rect(x: f32, y: f32, w: f32, h: f32) -> Self {
        BrickShape::Rect { x, y, w, h }
    }

    /// Build a polygon brick, deriving its bounding box and centroid
    pub fn polygon(vertices: [Vec2; 4]) -> Self {
        let bounds = Aabb::from_points(&vertices);
        let centroid = vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32;
        BrickShape::Polygon {
            vertices,
            bounds,
            centroid,
        }
    }

    /// Bounding box used for broad-phase culling
    pub fn bounds(&self) -> Aabb {
        match *self {
            BrickShape::Rect { x, y, w, h } => Aabb::from_rect(x, y, w, h),
            BrickShape::Polygon { bounds, .. } => bounds,
        }
    }

    /// Center used for particle bursts and power-up drops
    pub fn center(&self) -> Vec2 {
        match *self {
            BrickShape::Rect { x, y, w, h } => Vec2::new(x + w / 2.0, y + h / 2.0),
            BrickShape::Polygon { centroid, .. } => centroid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_derives_bounds_and_centroid() {
        let shape = BrickShape::polygon([
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 1.0),
            Vec2::new(9.0, 8.0),
            Vec2::new(-1.0, 7.0),
        ]);
        let bounds = shape.bounds();
        assert_eq!(bounds.min, Vec2::new(-1.0, 0.0));
        assert_eq!(bounds.max, Vec2::new(10.0, 8.0));
        assert_eq!(shape.center(), Vec2::new(4.5, 4.0));
    }

    #[test]
    fn test_aabb_overlaps_circle() {
        let b = Aabb::from_rect(10.0, 10.0, 20.0, 10.0);
        assert!(b.overlaps_circle(Vec2::new(5.0, 15.0), 6.0));
        assert!(!b.overlaps_circle(Vec2::new(5.0, 15.0), 5.0));
        assert!(!b.overlaps_circle(Vec2::new(50.0, 50.0), 8.0));
    }
}
