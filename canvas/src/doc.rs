//! Document model: shapes, their wire encoding, and the ordered shape list.
//!
//! This module defines what is on the board (`Shape`, `ShapeKind`), the
//! identifier that keys every shape (`ShapeId`), the JSON envelope carried in
//! relay and event-log messages (`ShapeEnvelope`), and the in-memory list that
//! owns all committed shapes (`ShapeList`).
//!
//! Data flows into this layer from the network (JSON decoding) and from the
//! input engine (committed gestures). The renderer and hit-tester read from
//! `ShapeList` in insertion order; later shapes are drawn above earlier ones.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_COLOR, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE};
use crate::geom::{self, Point};

/// Error produced when a shape payload cannot be decoded or fails validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("malformed shape: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ShapeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// =============================================================
// Identity
// =============================================================

/// Unique identifier for a shape.
///
/// New shapes get a random UUID v4. Ids from older peers are arbitrary
/// strings and are kept verbatim; equality is plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// Fresh random id for a locally created shape.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShapeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ShapeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// =============================================================
// Shapes
// =============================================================

/// Geometry of a shape, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeKind {
    /// Axis-aligned rectangle outline.
    Rect { x: f64, y: f64, width: f64, height: f64 },
    /// Circle outline.
    #[serde(rename_all = "camelCase")]
    Circle { center_x: f64, center_y: f64, radius: f64 },
    /// Freehand polyline, in drawing order.
    Pencil { points: Vec<Point> },
    /// Straight segment.
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Segment with a filled arrowhead at (`x2`, `y2`).
    #[serde(alias = "arrowRight")]
    Arrow { x1: f64, y1: f64, x2: f64, y2: f64 },
    /// Text anchored at its baseline start.
    #[serde(rename_all = "camelCase")]
    Text {
        x: f64,
        y: f64,
        font_size: f64,
        #[serde(default = "default_font_family")]
        font_family: String,
        #[serde(default)]
        text: String,
    },
}

fn default_color() -> String {
    DEFAULT_COLOR.to_owned()
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_owned()
}

impl ShapeKind {
    /// Rectangle spanning two corners, normalized to non-negative extents.
    #[must_use]
    pub fn rect(a: Point, b: Point) -> Self {
        Self::Rect {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    /// Circle whose diameter is the segment `a`-`b`.
    #[must_use]
    pub fn circle(a: Point, b: Point) -> Self {
        let center = geom::midpoint(a, b);
        Self::Circle { center_x: center.x, center_y: center.y, radius: geom::distance(a, b) / 2.0 }
    }

    #[must_use]
    pub fn line(a: Point, b: Point) -> Self {
        Self::Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y }
    }

    #[must_use]
    pub fn arrow(a: Point, b: Point) -> Self {
        Self::Arrow { x1: a.x, y1: a.y, x2: b.x, y2: b.y }
    }

    #[must_use]
    pub fn pencil(points: Vec<Point>) -> Self {
        Self::Pencil { points }
    }

    /// Text in the default font at `anchor`.
    #[must_use]
    pub fn text(anchor: Point, text: impl Into<String>) -> Self {
        Self::Text {
            x: anchor.x,
            y: anchor.y,
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            text: text.into(),
        }
    }

    /// Wire tag for this variant.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Circle { .. } => "circle",
            Self::Pencil { .. } => "pencil",
            Self::Line { .. } => "line",
            Self::Arrow { .. } => "arrow",
            Self::Text { .. } => "text",
        }
    }

    fn validate(&self) -> Result<(), ShapeError> {
        let finite = |values: &[f64]| values.iter().all(|v| v.is_finite());
        let ok = match self {
            Self::Rect { x, y, width, height } => finite(&[*x, *y, *width, *height]),
            Self::Circle { center_x, center_y, radius } => {
                finite(&[*center_x, *center_y, *radius]) && *radius >= 0.0
            }
            Self::Pencil { points } => !points.is_empty() && points.iter().all(|p| p.is_finite()),
            Self::Line { x1, y1, x2, y2 } | Self::Arrow { x1, y1, x2, y2 } => finite(&[*x1, *y1, *x2, *y2]),
            Self::Text { x, y, font_size, .. } => finite(&[*x, *y, *font_size]) && *font_size > 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(ShapeError::Malformed(format!("invalid {} geometry", self.type_name())))
        }
    }
}

/// A committed shape as stored in the list and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    /// Stable identity, assigned by the creating client.
    pub id: ShapeId,
    /// CSS color used for stroke and fill.
    #[serde(default = "default_color")]
    pub color: String,
    /// Variant geometry.
    #[serde(flatten)]
    pub kind: ShapeKind,
}

impl Shape {
    /// New shape with a freshly generated id.
    #[must_use]
    pub fn new(kind: ShapeKind, color: impl Into<String>) -> Self {
        Self { id: ShapeId::generate(), color: color.into(), kind }
    }

    /// Check geometry invariants (finite coordinates, non-negative radius,
    /// at least one pencil point, positive font size).
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::Malformed`] naming the offending variant.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.id.as_str().is_empty() {
            return Err(ShapeError::Malformed("empty shape id".to_owned()));
        }
        self.kind.validate()
    }
}

/// The `{ "shape": ... }` wrapper carried in relay and event-log messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeEnvelope {
    pub shape: Shape,
}

/// Encode a bare shape as JSON text.
///
/// # Errors
///
/// Returns [`ShapeError::Malformed`] if the shape fails validation.
pub fn encode_shape(shape: &Shape) -> Result<String, ShapeError> {
    shape.validate()?;
    Ok(serde_json::to_string(shape)?)
}

/// Decode and validate a bare shape.
///
/// # Errors
///
/// Returns [`ShapeError::Malformed`] for invalid JSON, an unknown `type`,
/// missing fields, or geometry that fails validation.
pub fn decode_shape(text: &str) -> Result<Shape, ShapeError> {
    let shape: Shape = serde_json::from_str(text)?;
    shape.validate()?;
    Ok(shape)
}

/// Encode a shape wrapped in its event envelope, as broadcast and persisted.
///
/// # Errors
///
/// Returns [`ShapeError::Malformed`] if the shape fails validation.
pub fn encode_event(shape: &Shape) -> Result<String, ShapeError> {
    shape.validate()?;
    Ok(serde_json::to_string(&ShapeEnvelope { shape: shape.clone() })?)
}

/// Decode an event envelope and return the validated shape inside it.
///
/// # Errors
///
/// Returns [`ShapeError::Malformed`] under the same conditions as
/// [`decode_shape`], or when the `shape` key is missing.
pub fn decode_event(text: &str) -> Result<Shape, ShapeError> {
    let envelope: ShapeEnvelope = serde_json::from_str(text)?;
    envelope.shape.validate()?;
    Ok(envelope.shape)
}

// =============================================================
// Shape list
// =============================================================

/// Ordered list of committed shapes. Index order is z-order.
///
/// Ids are unique within the list: inserting a shape whose id is already
/// present is refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeList {
    shapes: Vec<Shape>,
}

impl ShapeList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append on top. Returns `false` if the id is already present.
    pub fn append(&mut self, shape: Shape) -> bool {
        if self.contains(&shape.id) {
            return false;
        }
        self.shapes.push(shape);
        true
    }

    /// Insert at `index`, clamped to the current length. Returns `false` if
    /// the id is already present.
    pub fn insert(&mut self, index: usize, shape: Shape) -> bool {
        if self.contains(&shape.id) {
            return false;
        }
        let index = index.min(self.shapes.len());
        self.shapes.insert(index, shape);
        true
    }

    /// Remove by id, returning the former index and the shape.
    pub fn remove(&mut self, id: &ShapeId) -> Option<(usize, Shape)> {
        let index = self.position(id)?;
        Some((index, self.shapes.remove(index)))
    }

    /// Replace the whole list, dropping later duplicates of an id.
    pub fn replace_all(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.shapes.clear();
        for shape in shapes {
            self.append(shape);
        }
    }

    #[must_use]
    pub fn position(&self, id: &ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| &s.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ShapeId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }

    /// Shapes bottom to top.
    pub fn iter(&self) -> std::slice::Iter<'_, Shape> {
        self.shapes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

impl<'a> IntoIterator for &'a ShapeList {
    type Item = &'a Shape;
    type IntoIter = std::slice::Iter<'a, Shape>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
