//! Line segments and segment-segment intersection
//!
//! The stroker works on segments whose direction and normal are computed once
//! at construction and reused for every edge offset, joint and cap.

use crate::geometry::{Point, Vec2};

/// Below this magnitude of `cross(r, s)` two segments are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-4;

/// A line segment from `a` to `b` with its unit direction cached
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    pub a: Point,
    pub b: Point,
    direction: Vec2,
}

impl LineSegment {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            direction: (b - a).normalize(),
        }
    }

    /// Unnormalized vector from `a` to `b`
    pub fn vector(&self) -> Vec2 {
        self.b - self.a
    }

    /// Unit direction (zero for a zero-length segment)
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Unit normal, counter-clockwise from the direction
    pub fn normal(&self) -> Vec2 {
        self.direction.perp()
    }

    pub fn length(&self) -> f32 {
        self.vector().length()
    }

    /// Translate both endpoints
    pub fn offset(&self, by: Vec2) -> LineSegment {
        LineSegment {
            a: self.a + by,
            b: self.b + by,
            direction: self.direction,
        }
    }

    /// Intersection with another segment
    ///
    /// With `infinite` set both segments are treated as infinite lines. Parallel
    /// (or nearly parallel) segments never intersect.
    pub fn intersection(&self, other: &LineSegment, infinite: bool) -> Option<Point> {
        let r = self.vector();
        let s = other.vector();
        let origin_dist = other.a - self.a;

        let denominator = r.cross(s);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }

        let u = origin_dist.cross(r) / denominator;
        let t = origin_dist.cross(s) / denominator;

        if !infinite && !((0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)) {
            return None;
        }

        Some(self.a + r * t)
    }
}
