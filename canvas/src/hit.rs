#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{LINE_TOLERANCE, PENCIL_TOLERANCE};
use crate::doc::{Shape, ShapeKind, ShapeList};
use crate::geom::{self, Point};

/// Eraser slop for a shape variant. Filled-area shapes report zero.
#[must_use]
pub fn default_tolerance(kind: &ShapeKind) -> f64 {
    match kind {
        ShapeKind::Line { .. } | ShapeKind::Arrow { .. } => LINE_TOLERANCE,
        ShapeKind::Pencil { .. } => PENCIL_TOLERANCE,
        ShapeKind::Rect { .. } | ShapeKind::Circle { .. } | ShapeKind::Text { .. } => 0.0,
    }
}

/// Whether `point` lies on `kind`.
///
/// Rectangles test inclusive bounds (negative extents from older peers are
/// accepted), circles test the closed disc, and segment shapes test distance
/// to the nearest segment against `tolerance`. Text is never hit.
#[must_use]
pub fn contains(point: Point, kind: &ShapeKind, tolerance: f64) -> bool {
    match kind {
        ShapeKind::Rect { x, y, width, height } => {
            let (left, right) = (x.min(x + width), x.max(x + width));
            let (top, bottom) = (y.min(y + height), y.max(y + height));
            (left..=right).contains(&point.x) && (top..=bottom).contains(&point.y)
        }
        ShapeKind::Circle { center_x, center_y, radius } => {
            geom::distance(point, Point::new(*center_x, *center_y)) <= *radius
        }
        ShapeKind::Line { x1, y1, x2, y2 } | ShapeKind::Arrow { x1, y1, x2, y2 } => {
            geom::point_segment_distance(point, Point::new(*x1, *y1), Point::new(*x2, *y2)) <= tolerance
        }
        ShapeKind::Pencil { points } => points
            .windows(2)
            .any(|pair| geom::point_segment_distance(point, pair[0], pair[1]) <= tolerance),
        ShapeKind::Text { .. } => false,
    }
}

/// [`contains`] with the variant's default tolerance.
#[must_use]
pub fn hit_shape(point: Point, shape: &Shape) -> bool {
    contains(point, &shape.kind, default_tolerance(&shape.kind))
}

/// The most recently added shape under `point`, if any.
#[must_use]
pub fn find_topmost_at(point: Point, shapes: &ShapeList) -> Option<&Shape> {
    shapes.iter().rev().find(|shape| hit_shape(point, shape))
}
