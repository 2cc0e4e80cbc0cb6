//! Shared numeric and style constants for the canvas crate.

use std::f64::consts::PI;

// ── Hit-testing ─────────────────────────────────────────────────

/// Eraser slop in world units for line and arrow segments.
pub const LINE_TOLERANCE: f64 = 5.0;

/// Eraser slop in world units for freehand pencil strokes.
pub const PENCIL_TOLERANCE: f64 = 10.0;

// ── Stroke style ────────────────────────────────────────────────

/// Outline width used for every shape and preview.
pub const STROKE_WIDTH: f64 = 2.0;

/// Arrowhead length in world units.
pub const ARROW_SIZE: f64 = 10.0;

/// Arrowhead half-angle in radians (30°).
pub const ARROW_ANGLE: f64 = PI / 6.0;

// ── Colors ──────────────────────────────────────────────────────

/// Board background fill.
pub const BACKGROUND: &str = "#000000";

/// Stroke color for new shapes and for peers that omit `color`.
pub const DEFAULT_COLOR: &str = "#ffffff";

// ── Gestures ────────────────────────────────────────────────────

/// Drags shorter than this between press and release commit nothing.
pub const MIN_DRAG_DISTANCE: f64 = 2.0;

// ── Text ────────────────────────────────────────────────────────

/// Font size in world units for text created with the text tool.
pub const DEFAULT_FONT_SIZE: f64 = 20.0;

/// CSS font family for text created with the text tool.
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

// ── Cursors ─────────────────────────────────────────────────────

/// CSS cursor shown while the eraser is active.
pub const CURSOR_ERASER: &str = "crosshair";

/// CSS cursor for every drawing tool.
pub const CURSOR_DEFAULT: &str = "default";
