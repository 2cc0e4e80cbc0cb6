//! Input model: tools, persistent UI state, and the gesture state machine.
//!
//! `Tool` and `UiState` capture what the user has selected. `InputState` is
//! the gesture tracked between pointer-down and pointer-up; it snapshots the
//! tool and color at pointer-down so a toolbar change mid-drag cannot tear
//! the gesture. The transitions themselves live in
//! [`crate::engine::EngineCore`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{CURSOR_DEFAULT, CURSOR_ERASER, DEFAULT_COLOR, MIN_DRAG_DISTANCE};
use crate::doc::ShapeKind;
use crate::geom::{self, Point};
use crate::render::Preview;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand stroke.
    Pencil,
    /// Rectangle between press and release corners.
    Rect,
    /// Circle whose diameter is the drag (default).
    #[default]
    Circle,
    /// Straight line segment.
    Line,
    /// Line with an arrowhead at the release point.
    #[serde(alias = "arrowRight")]
    Arrow,
    /// Delete the topmost shape under the pointer.
    Eraser,
    /// Place text at the press point.
    Text,
}

/// Error returned when parsing an unrecognized tool name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl Tool {
    pub const ALL: [Tool; 7] = [
        Self::Pencil,
        Self::Rect,
        Self::Circle,
        Self::Line,
        Self::Arrow,
        Self::Eraser,
        Self::Text,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pencil => "pencil",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Eraser => "eraser",
            Self::Text => "text",
        }
    }

    /// Whether a press-drag-release with this tool produces a shape.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pencil | Self::Rect | Self::Circle | Self::Line | Self::Arrow)
    }

    /// CSS cursor to show over the canvas while this tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Eraser => CURSOR_ERASER,
            _ => CURSOR_DEFAULT,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arrowRight" => Ok(Self::Arrow),
            _ => Self::ALL
                .into_iter()
                .find(|tool| tool.as_str().eq_ignore_ascii_case(s))
                .ok_or_else(|| UnknownTool(s.to_owned())),
        }
    }
}

/// Persistent UI state, settable at any time by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// CSS color for the next gesture.
    pub color: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self { tool: Tool::default(), color: DEFAULT_COLOR.to_owned() }
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A drawing tool is between pointer-down and pointer-up.
    Drawing {
        /// Tool captured at pointer-down.
        tool: Tool,
        /// Color captured at pointer-down.
        color: String,
        /// Pointer-down position.
        origin: Point,
        /// Latest pointer position.
        current: Point,
        /// Every sampled position, for pencil strokes.
        points: Vec<Point>,
    },
}

impl InputState {
    /// Start a gesture for `tool` at `origin`. Non-drawing tools stay idle.
    #[must_use]
    pub fn begin(tool: Tool, color: &str, origin: Point) -> Self {
        if !tool.is_drawing() {
            return Self::Idle;
        }
        Self::Drawing { tool, color: color.to_owned(), origin, current: origin, points: vec![origin] }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Record a pointer move. Returns `false` when idle.
    pub fn track(&mut self, pt: Point) -> bool {
        let Self::Drawing { tool, current, points, .. } = self else {
            return false;
        };
        *current = pt;
        if *tool == Tool::Pencil {
            points.push(pt);
        }
        true
    }

    /// Geometry to draw for the gesture in progress.
    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        let Self::Drawing { tool, color, origin, current, points } = self else {
            return None;
        };
        let kind = match tool {
            Tool::Pencil => ShapeKind::pencil(points.clone()),
            Tool::Rect => ShapeKind::rect(*origin, *current),
            Tool::Circle => ShapeKind::circle(*origin, *current),
            Tool::Line => ShapeKind::line(*origin, *current),
            Tool::Arrow => ShapeKind::arrow(*origin, *current),
            Tool::Eraser | Tool::Text => return None,
        };
        Some(Preview { kind, color: color.clone() })
    }
}

/// Final geometry for a completed drag, or `None` when the gesture commits
/// nothing (single-sample pencil, drags shorter than [`MIN_DRAG_DISTANCE`],
/// non-drawing tools).
#[must_use]
pub fn shape_from_drag(tool: Tool, origin: Point, release: Point, points: Vec<Point>) -> Option<ShapeKind> {
    if tool == Tool::Pencil {
        return (points.len() >= 2).then(|| ShapeKind::pencil(points));
    }
    if geom::distance(origin, release) < MIN_DRAG_DISTANCE {
        return None;
    }
    match tool {
        Tool::Rect => Some(ShapeKind::rect(origin, release)),
        Tool::Circle => Some(ShapeKind::circle(origin, release)),
        Tool::Line => Some(ShapeKind::line(origin, release)),
        Tool::Arrow => Some(ShapeKind::arrow(origin, release)),
        Tool::Pencil | Tool::Eraser | Tool::Text => None,
    }
}
