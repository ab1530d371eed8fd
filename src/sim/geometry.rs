//! Geometry kernel: circle vs axis-aligned rectangle
//!
//! Narrow-phase tests run on every broad-phase candidate, so nothing here
//! validates its inputs. A non-positive radius or a negative-size rectangle is
//! caller error.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (origin at the minimum corner)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Coarse overlap test. Rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Clamp a point into the rectangle
    #[inline]
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    /// Move the rectangle by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y, self.w, self.h)
    }
}

/// A circle (balls, projectiles, bombs, splash areas)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Bounding box of the circle
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.radius * 2.0,
            self.radius * 2.0,
        )
    }
}

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub collided: bool,
    /// Unit normal pointing from the rectangle toward the circle center
    pub normal: Vec2,
    /// Closest point on the rectangle to the circle center
    pub contact_point: Vec2,
    /// How far the circle overlaps the rectangle
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            collided: false,
            normal: Vec2::ZERO,
            contact_point: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Test a circle against an axis-aligned rectangle.
///
/// The circle center is clamped into the rectangle to find the closest point.
/// A circle that exactly touches the rectangle (distance == radius) counts as
/// a collision.
///
/// When the center sits inside the rectangle the closest point is the center
/// itself, so the normal points toward the nearest edge instead. Equal edge
/// distances resolve in the order left, right, top, bottom.
pub fn circle_rect_test(circle: &Circle, rect: &Rect) -> CollisionResult {
    let closest = rect.clamp_point(circle.center);
    let offset = circle.center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > circle.radius * circle.radius {
        return CollisionResult::miss();
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            collided: true,
            normal: offset / dist,
            contact_point: closest,
            penetration: circle.radius - dist,
        };
    }

    // Center inside (or on the border of) the rectangle
    let c = circle.center;
    let min = rect.min();
    let max = rect.max();
    let edges = [
        (c.x - min.x, Vec2::NEG_X, Vec2::new(min.x, c.y)),
        (max.x - c.x, Vec2::X, Vec2::new(max.x, c.y)),
        (c.y - min.y, Vec2::NEG_Y, Vec2::new(c.x, min.y)),
        (max.y - c.y, Vec2::Y, Vec2::new(c.x, max.y)),
    ];

    let mut nearest = edges[0];
    for edge in &edges[1..] {
        // Strict comparison keeps the earlier edge on ties
        if edge.0 < nearest.0 {
            nearest = *edge;
        }
    }

    let (edge_dist, normal, contact_point) = nearest;
    CollisionResult {
        collided: true,
        normal,
        contact_point,
        penetration: circle.radius + edge_dist,
    }
}

/// Reflect a vector off a surface
///
/// Standard reflection: v' = v - 2(v·n)n. Preserves |v| for a unit normal.
#[inline]
pub fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Normalize `v`, or return `fallback` when `v` has no usable direction
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > f32::EPSILON {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}
