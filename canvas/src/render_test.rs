#![allow(clippy::float_cmp)]

use std::convert::Infallible;

use super::*;
use crate::consts::{ARROW_SIZE, DEFAULT_COLOR};
use crate::doc::{Shape, ShapeId};

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Clear(f64, f64, f64, f64),
    FillStyle(String),
    StrokeStyle(String),
    LineWidth(f64),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    Arc(f64, f64, f64),
    Stroke,
    Fill,
    Font(String),
    Text(String, f64, f64),
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
}

impl Surface for Recorder {
    type Error = Infallible;

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::Clear(x, y, width, height));
    }
    fn set_fill_style(&mut self, color: &str) {
        self.ops.push(Op::FillStyle(color.to_owned()));
    }
    fn set_stroke_style(&mut self, color: &str) {
        self.ops.push(Op::StrokeStyle(color.to_owned()));
    }
    fn set_line_width(&mut self, width: f64) {
        self.ops.push(Op::LineWidth(width));
    }
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::FillRect(x, y, width, height));
    }
    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(Op::StrokeRect(x, y, width, height));
    }
    fn begin_path(&mut self) {
        self.ops.push(Op::BeginPath);
    }
    fn move_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::MoveTo(x, y));
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.ops.push(Op::LineTo(x, y));
    }
    fn close_path(&mut self) {
        self.ops.push(Op::ClosePath);
    }
    fn arc(&mut self, x: f64, y: f64, radius: f64, _start: f64, _end: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Arc(x, y, radius));
        Ok(())
    }
    fn stroke(&mut self) {
        self.ops.push(Op::Stroke);
    }
    fn fill(&mut self) {
        self.ops.push(Op::Fill);
    }
    fn set_font(&mut self, font: &str) {
        self.ops.push(Op::Font(font.to_owned()));
    }
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<(), Infallible> {
        self.ops.push(Op::Text(text.to_owned(), x, y));
        Ok(())
    }
}

fn shape(id: &str, color: &str, kind: ShapeKind) -> Shape {
    Shape { id: ShapeId::from(id), color: color.to_owned(), kind }
}

fn render(shapes: &ShapeList, preview: Option<&Preview>) -> Vec<Op> {
    let mut rec = Recorder::default();
    let Ok(()) = draw(&mut rec, shapes, preview, 800.0, 600.0);
    rec.ops
}

// =============================================================
// Frame layout
// =============================================================

#[test]
fn empty_board_clears_and_fills_background() {
    let ops = render(&ShapeList::new(), None);
    assert_eq!(
        ops,
        vec![
            Op::Clear(0.0, 0.0, 800.0, 600.0),
            Op::FillStyle(BACKGROUND.to_owned()),
            Op::FillRect(0.0, 0.0, 800.0, 600.0),
        ]
    );
}

#[test]
fn shapes_draw_in_list_order() {
    let mut list = ShapeList::new();
    list.append(shape("a", "#111", ShapeKind::Rect { x: 1.0, y: 1.0, width: 5.0, height: 5.0 }));
    list.append(shape("b", "#222", ShapeKind::Rect { x: 2.0, y: 2.0, width: 5.0, height: 5.0 }));
    let ops = render(&list, None);
    let rects: Vec<&Op> = ops.iter().filter(|op| matches!(op, Op::StrokeRect(..))).collect();
    assert_eq!(rects, [&Op::StrokeRect(1.0, 1.0, 5.0, 5.0), &Op::StrokeRect(2.0, 2.0, 5.0, 5.0)]);
}

#[test]
fn every_shape_uses_its_color_and_stroke_width() {
    let mut list = ShapeList::new();
    list.append(shape("a", "#abcdef", ShapeKind::line(Point::new(0.0, 0.0), Point::new(1.0, 1.0))));
    let ops = render(&list, None);
    assert!(ops.contains(&Op::StrokeStyle("#abcdef".to_owned())));
    assert!(ops.contains(&Op::LineWidth(STROKE_WIDTH)));
}

#[test]
fn preview_draws_last_in_gesture_color() {
    let mut list = ShapeList::new();
    list.append(shape("a", DEFAULT_COLOR, ShapeKind::Rect { x: 0.0, y: 0.0, width: 5.0, height: 5.0 }));
    let preview = Preview {
        kind: ShapeKind::Circle { center_x: 10.0, center_y: 0.0, radius: 10.0 },
        color: "#ff0000".to_owned(),
    };
    let ops = render(&list, Some(&preview));
    let last_style = ops
        .iter()
        .rev()
        .find_map(|op| match op {
            Op::StrokeStyle(c) => Some(c.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_style, "#ff0000");
    assert_eq!(ops[ops.len() - 3], Op::Arc(10.0, 0.0, 10.0));
}

// =============================================================
// Per-variant recipes
// =============================================================

#[test]
fn circle_is_an_outline() {
    let mut list = ShapeList::new();
    list.append(shape("c", "#fff", ShapeKind::Circle { center_x: 3.0, center_y: 4.0, radius: 5.0 }));
    let ops = render(&list, None);
    assert!(ops.contains(&Op::Arc(3.0, 4.0, 5.0)));
    assert!(ops.contains(&Op::Stroke));
    assert!(!ops.contains(&Op::Fill));
}

#[test]
fn pencil_draws_polyline() {
    let mut list = ShapeList::new();
    let points = vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0)];
    list.append(shape("p", "#fff", ShapeKind::pencil(points)));
    let ops = render(&list, None);
    assert!(ops.contains(&Op::MoveTo(0.0, 0.0)));
    assert!(ops.contains(&Op::LineTo(5.0, 5.0)));
    assert!(ops.contains(&Op::LineTo(10.0, 0.0)));
}

#[test]
fn single_point_pencil_draws_nothing() {
    let mut list = ShapeList::new();
    list.append(shape("p", "#fff", ShapeKind::pencil(vec![Point::new(1.0, 1.0)])));
    let ops = render(&list, None);
    assert!(!ops.contains(&Op::BeginPath));
}

#[test]
fn arrow_draws_shaft_and_filled_head() {
    let mut list = ShapeList::new();
    list.append(shape("a", "#fff", ShapeKind::arrow(Point::new(0.0, 0.0), Point::new(100.0, 0.0))));
    let ops = render(&list, None);
    assert!(ops.contains(&Op::LineTo(100.0, 0.0)));
    assert_eq!(ops.last(), Some(&Op::Fill));

    let head: Vec<(f64, f64)> = ops
        .iter()
        .skip_while(|op| **op != Op::MoveTo(100.0, 0.0))
        .filter_map(|op| match op {
            Op::LineTo(x, y) => Some((*x, *y)),
            _ => None,
        })
        .collect();
    assert_eq!(head.len(), 2);
    for (x, y) in head {
        let len = (100.0 - x).hypot(y);
        assert!((len - ARROW_SIZE).abs() < 1e-9);
    }
}

#[test]
fn text_uses_font_and_fill() {
    let mut list = ShapeList::new();
    list.append(shape("t", "#fff", ShapeKind::text(Point::new(7.0, 9.0), "hello")));
    let ops = render(&list, None);
    assert!(ops.contains(&Op::Font("20px sans-serif".to_owned())));
    assert!(ops.contains(&Op::Text("hello".to_owned(), 7.0, 9.0)));
}

#[test]
fn blank_text_draws_nothing() {
    let mut list = ShapeList::new();
    list.append(shape("t", "#fff", ShapeKind::text(Point::new(7.0, 9.0), "")));
    let ops = render(&list, None);
    assert!(!ops.iter().any(|op| matches!(op, Op::Text(..))));
}
