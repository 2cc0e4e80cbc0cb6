//! Plane geometry shared by hit-testing, rendering, and gesture handling.
//!
//! Everything here works in a single coordinate space: canvas pixels with
//! the origin at the top-left corner and `y` growing downward.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{ARROW_ANGLE, ARROW_SIZE};

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        distance(self, other)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Point halfway between `a` and `b`.
#[must_use]
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new(a.x + (b.x - a.x) / 2.0, a.y + (b.y - a.y) / 2.0)
}

/// Distance from `p` to the closest point on segment `a`-`b`.
///
/// The projection is clamped to the segment, so points beyond either end
/// measure to that endpoint. A zero-length segment measures to `a`.
#[must_use]
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + t * dx, a.y + t * dy))
}

/// The two base vertices of the arrowhead drawn at `tip` for a shaft
/// starting at `tail`. Together with `tip` they form the filled triangle.
#[must_use]
pub fn arrowhead(tail: Point, tip: Point) -> [Point; 2] {
    let angle = (tip.y - tail.y).atan2(tip.x - tail.x);
    [
        Point::new(
            tip.x - ARROW_SIZE * (angle - ARROW_ANGLE).cos(),
            tip.y - ARROW_SIZE * (angle - ARROW_ANGLE).sin(),
        ),
        Point::new(
            tip.x - ARROW_SIZE * (angle + ARROW_ANGLE).cos(),
            tip.y - ARROW_SIZE * (angle + ARROW_ANGLE).sin(),
        ),
    ]
}
