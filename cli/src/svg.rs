//! SVG drawing surface for board export.
//!
//! Implements the canvas `Surface` trait by recording each stroke, fill,
//! and text call as an SVG element. `clear_rect` starts a new document sized
//! to the cleared area, so rendering a board twice yields the last frame.

use std::convert::Infallible;
use std::f64::consts::TAU;

use canvas::render::Surface;

pub struct SvgSurface {
    width: f64,
    height: f64,
    fill: String,
    stroke: String,
    line_width: f64,
    font: String,
    path: String,
    elements: Vec<String>,
}

impl SvgSurface {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            fill: "#000000".to_owned(),
            stroke: "#000000".to_owned(),
            line_width: 1.0,
            font: "10px sans-serif".to_owned(),
            path: String::new(),
            elements: Vec::new(),
        }
    }

    /// Number of elements drawn since the last full clear.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// The finished SVG document.
    #[must_use]
    pub fn finish(&self) -> String {
        let (w, h) = (self.width, self.height);
        let mut doc = format!(r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#);
        doc.push('\n');
        for element in &self.elements {
            doc.push_str("  ");
            doc.push_str(element);
            doc.push('\n');
        }
        doc.push_str("</svg>\n");
        doc
    }

    fn push_path(&mut self, segment: &str) {
        if !self.path.is_empty() {
            self.path.push(' ');
        }
        self.path.push_str(segment);
    }
}

impl Surface for SvgSurface {
    type Error = Infallible;

    fn clear_rect(&mut self, _x: f64, _y: f64, width: f64, height: f64) {
        self.elements.clear();
        self.path.clear();
        self.width = width;
        self.height = height;
    }

    fn set_fill_style(&mut self, color: &str) {
        color.clone_into(&mut self.fill);
    }

    fn set_stroke_style(&mut self, color: &str) {
        color.clone_into(&mut self.stroke);
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let fill = escape(&self.fill);
        self.elements.push(format!(r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{fill}"/>"#));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (stroke, lw) = (escape(&self.stroke), self.line_width);
        self.elements.push(format!(
            r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="none" stroke="{stroke}" stroke-width="{lw}"/>"#
        ));
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push_path(&format!("M {x} {y}"));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_path(&format!("L {x} {y}"));
    }

    fn close_path(&mut self) {
        self.push_path("Z");
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) -> Result<(), Infallible> {
        let point = |angle: f64| (x + radius * angle.cos(), y + radius * angle.sin());
        let (sx, sy) = point(start);
        let verb = if self.path.is_empty() { "M" } else { "L" };
        self.push_path(&format!("{verb} {sx} {sy}"));

        let sweep = end - start;
        if sweep.abs() >= TAU {
            // SVG cannot draw a full circle with one arc command.
            let (mx, my) = point(start + std::f64::consts::PI);
            self.push_path(&format!("A {radius} {radius} 0 1 1 {mx} {my}"));
            self.push_path(&format!("A {radius} {radius} 0 1 1 {sx} {sy}"));
        } else {
            let (ex, ey) = point(end);
            let large = u8::from(sweep.abs() > std::f64::consts::PI);
            let clockwise = u8::from(sweep >= 0.0);
            self.push_path(&format!("A {radius} {radius} 0 {large} {clockwise} {ex} {ey}"));
        }
        Ok(())
    }

    fn stroke(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let (stroke, lw) = (escape(&self.stroke), self.line_width);
        self.elements.push(format!(r#"<path d="{}" fill="none" stroke="{stroke}" stroke-width="{lw}"/>"#, self.path));
    }

    fn fill(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let fill = escape(&self.fill);
        self.elements.push(format!(r#"<path d="{}" fill="{fill}"/>"#, self.path));
    }

    fn set_font(&mut self, font: &str) {
        font.clone_into(&mut self.font);
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Infallible> {
        let (fill, font) = (escape(&self.fill), escape(&self.font));
        self.elements.push(format!(r#"<text x="{x}" y="{y}" fill="{fill}" style="font: {font}">{}</text>"#, escape(text)));
        Ok(())
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "svg_test.rs"]
mod svg_test;
