//! Rendering: draws the full board to a 2D drawing surface.
//!
//! Drawing goes through the [`Surface`] trait, a narrow slice of the Canvas 2D
//! API. The browser implementation forwards to
//! [`web_sys::CanvasRenderingContext2d`]; native hosts (SVG export, tests)
//! provide their own. This module reads shape state and produces pixels; it
//! never mutates application state.
//!
//! Every frame is a full redraw: clear, background, committed shapes in list
//! order, then the in-progress preview on top.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::consts::{BACKGROUND, STROKE_WIDTH};
use crate::doc::{ShapeKind, ShapeList};
use crate::geom::{self, Point};

/// The subset of the Canvas 2D API the renderer needs.
///
/// Calls that can fail in the browser return `Result`; the rest mirror the
/// infallible setters and path builders.
pub trait Surface {
    type Error;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);

    /// Full-circle arc from `start` to `end` radians.
    ///
    /// # Errors
    ///
    /// Fails if the surface rejects the arc (e.g. negative radius).
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Self::Error>;
    fn stroke(&mut self);
    fn fill(&mut self);
    fn set_font(&mut self, font: &str);

    /// # Errors
    ///
    /// Fails if the surface cannot lay out the text.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Self::Error>;
}

impl Surface for CanvasRenderingContext2d {
    type Error = JsValue;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::clear_rect(self, x, y, width, height);
    }

    fn set_fill_style(&mut self, color: &str) {
        self.set_fill_style_str(color);
    }

    fn set_stroke_style(&mut self, color: &str) {
        self.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f64) {
        CanvasRenderingContext2d::set_line_width(self, width);
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::fill_rect(self, x, y, width, height);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        CanvasRenderingContext2d::stroke_rect(self, x, y, width, height);
    }

    fn begin_path(&mut self) {
        CanvasRenderingContext2d::begin_path(self);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        CanvasRenderingContext2d::line_to(self, x, y);
    }

    fn close_path(&mut self) {
        CanvasRenderingContext2d::close_path(self);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::arc(self, x, y, radius, start, end)
    }

    fn stroke(&mut self) {
        CanvasRenderingContext2d::stroke(self);
    }

    fn fill(&mut self) {
        CanvasRenderingContext2d::fill(self);
    }

    fn set_font(&mut self, font: &str) {
        CanvasRenderingContext2d::set_font(self, font);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), JsValue> {
        CanvasRenderingContext2d::fill_text(self, text, x, y)
    }
}

/// Geometry of the gesture in progress, drawn on top of committed shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub kind: ShapeKind,
    /// Color captured when the gesture started.
    pub color: String,
}

/// Draw the full board: background, every shape in list order, then the preview.
///
/// `width` and `height` are the surface size in canvas pixels.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn draw<S: Surface + ?Sized>(
    surface: &mut S,
    shapes: &ShapeList,
    preview: Option<&Preview>,
    width: f64,
    height: f64,
) -> Result<(), S::Error> {
    surface.clear_rect(0.0, 0.0, width, height);
    surface.set_fill_style(BACKGROUND);
    surface.fill_rect(0.0, 0.0, width, height);

    for shape in shapes {
        draw_shape(surface, &shape.kind, &shape.color)?;
    }

    if let Some(preview) = preview {
        draw_shape(surface, &preview.kind, &preview.color)?;
    }

    Ok(())
}

/// Draw one shape with the given color.
///
/// # Errors
///
/// Returns `Err` if any fallible surface call fails.
pub fn draw_shape<S: Surface + ?Sized>(surface: &mut S, kind: &ShapeKind, color: &str) -> Result<(), S::Error> {
    surface.set_stroke_style(color);
    surface.set_fill_style(color);
    surface.set_line_width(STROKE_WIDTH);

    match kind {
        ShapeKind::Rect { x, y, width, height } => {
            surface.stroke_rect(*x, *y, *width, *height);
        }
        ShapeKind::Circle { center_x, center_y, radius } => {
            surface.begin_path();
            surface.arc(*center_x, *center_y, radius.max(0.0), 0.0, 2.0 * PI)?;
            surface.stroke();
            surface.close_path();
        }
        ShapeKind::Pencil { points } => draw_polyline(surface, points),
        ShapeKind::Line { x1, y1, x2, y2 } => {
            draw_segment(surface, Point::new(*x1, *y1), Point::new(*x2, *y2));
        }
        ShapeKind::Arrow { x1, y1, x2, y2 } => {
            let (tail, tip) = (Point::new(*x1, *y1), Point::new(*x2, *y2));
            draw_segment(surface, tail, tip);
            draw_arrowhead(surface, tail, tip);
        }
        ShapeKind::Text { x, y, font_size, font_family, text } => {
            if !text.is_empty() {
                surface.set_font(&format!("{font_size}px {font_family}"));
                surface.fill_text(text, *x, *y)?;
            }
        }
    }
    Ok(())
}

// =============================================================
// Primitives
// =============================================================

fn draw_segment<S: Surface + ?Sized>(surface: &mut S, a: Point, b: Point) {
    surface.begin_path();
    surface.move_to(a.x, a.y);
    surface.line_to(b.x, b.y);
    surface.stroke();
    surface.close_path();
}

fn draw_polyline<S: Surface + ?Sized>(surface: &mut S, points: &[Point]) {
    // A lone press leaves nothing visible.
    let [first, rest @ ..] = points else {
        return;
    };
    if rest.is_empty() {
        return;
    }
    surface.begin_path();
    surface.move_to(first.x, first.y);
    for p in rest {
        surface.line_to(p.x, p.y);
    }
    surface.stroke();
    surface.close_path();
}

fn draw_arrowhead<S: Surface + ?Sized>(surface: &mut S, tail: Point, tip: Point) {
    let [left, right] = geom::arrowhead(tail, tip);
    surface.begin_path();
    surface.move_to(tip.x, tip.y);
    surface.line_to(left.x, left.y);
    surface.line_to(right.x, right.y);
    surface.close_path();
    surface.fill();
}
