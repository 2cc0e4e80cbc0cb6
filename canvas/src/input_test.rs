use super::*;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Tool
// =============================================================

#[test]
fn tool_default_is_circle() {
    assert_eq!(Tool::default(), Tool::Circle);
}

#[test]
fn tool_parses_names_case_insensitively() {
    assert_eq!("pencil".parse::<Tool>().unwrap(), Tool::Pencil);
    assert_eq!("RECT".parse::<Tool>().unwrap(), Tool::Rect);
    assert_eq!("arrowRight".parse::<Tool>().unwrap(), Tool::Arrow);
}

#[test]
fn tool_rejects_unknown_name() {
    assert_eq!("lasso".parse::<Tool>().unwrap_err(), UnknownTool("lasso".to_owned()));
}

#[test]
fn tool_display_round_trips_through_parse() {
    for tool in Tool::ALL {
        assert_eq!(tool.to_string().parse::<Tool>().unwrap(), tool);
    }
}

#[test]
fn eraser_uses_crosshair_cursor() {
    assert_eq!(Tool::Eraser.cursor(), "crosshair");
    assert_eq!(Tool::Pencil.cursor(), "default");
}

#[test]
fn drawing_tools() {
    assert!(Tool::Rect.is_drawing());
    assert!(Tool::Pencil.is_drawing());
    assert!(!Tool::Eraser.is_drawing());
    assert!(!Tool::Text.is_drawing());
}

#[test]
fn ui_state_default_color_is_white() {
    let ui = UiState::default();
    assert_eq!(ui.color, "#ffffff");
    assert_eq!(ui.tool, Tool::Circle);
}

// =============================================================
// InputState
// =============================================================

#[test]
fn input_state_default_is_idle() {
    assert!(InputState::default().is_idle());
}

#[test]
fn begin_with_eraser_stays_idle() {
    assert!(InputState::begin(Tool::Eraser, "#fff", p(0.0, 0.0)).is_idle());
    assert!(InputState::begin(Tool::Text, "#fff", p(0.0, 0.0)).is_idle());
}

#[test]
fn begin_seeds_pencil_points() {
    let state = InputState::begin(Tool::Pencil, "#fff", p(1.0, 2.0));
    let InputState::Drawing { points, .. } = state else {
        panic!("expected drawing");
    };
    assert_eq!(points, vec![p(1.0, 2.0)]);
}

#[test]
fn track_accumulates_only_for_pencil() {
    let mut pencil = InputState::begin(Tool::Pencil, "#fff", p(0.0, 0.0));
    assert!(pencil.track(p(1.0, 1.0)));
    assert!(pencil.track(p(2.0, 2.0)));
    let InputState::Drawing { points, .. } = &pencil else {
        panic!("expected drawing");
    };
    assert_eq!(points.len(), 3);

    let mut rect = InputState::begin(Tool::Rect, "#fff", p(0.0, 0.0));
    rect.track(p(5.0, 5.0));
    let InputState::Drawing { points, current, .. } = &rect else {
        panic!("expected drawing");
    };
    assert_eq!(points.len(), 1);
    assert_eq!(*current, p(5.0, 5.0));
}

#[test]
fn track_when_idle_is_noop() {
    let mut state = InputState::Idle;
    assert!(!state.track(p(1.0, 1.0)));
    assert!(state.is_idle());
}

#[test]
fn preview_uses_captured_color() {
    let mut state = InputState::begin(Tool::Line, "#123456", p(0.0, 0.0));
    state.track(p(10.0, 0.0));
    let preview = state.preview().unwrap();
    assert_eq!(preview.color, "#123456");
    assert_eq!(preview.kind, ShapeKind::line(p(0.0, 0.0), p(10.0, 0.0)));
}

#[test]
fn preview_when_idle_is_none() {
    assert!(InputState::Idle.preview().is_none());
}

// =============================================================
// shape_from_drag
// =============================================================

#[test]
fn circle_drag_yields_midpoint_center() {
    let kind = shape_from_drag(Tool::Circle, p(0.0, 0.0), p(20.0, 0.0), vec![]).unwrap();
    assert_eq!(kind, ShapeKind::Circle { center_x: 10.0, center_y: 0.0, radius: 10.0 });
}

#[test]
fn single_point_pencil_commits_nothing() {
    assert!(shape_from_drag(Tool::Pencil, p(0.0, 0.0), p(0.0, 0.0), vec![p(0.0, 0.0)]).is_none());
}

#[test]
fn two_point_pencil_commits() {
    let kind = shape_from_drag(Tool::Pencil, p(0.0, 0.0), p(1.0, 0.0), vec![p(0.0, 0.0), p(1.0, 0.0)]);
    assert!(matches!(kind, Some(ShapeKind::Pencil { .. })));
}

#[test]
fn click_without_drag_commits_nothing() {
    for tool in [Tool::Rect, Tool::Circle, Tool::Line, Tool::Arrow] {
        assert!(shape_from_drag(tool, p(5.0, 5.0), p(6.0, 5.0), vec![]).is_none(), "{tool}");
    }
}

#[test]
fn arrow_drag_keeps_direction() {
    let kind = shape_from_drag(Tool::Arrow, p(100.0, 0.0), p(0.0, 0.0), vec![]).unwrap();
    assert_eq!(kind, ShapeKind::Arrow { x1: 100.0, y1: 0.0, x2: 0.0, y2: 0.0 });
}

#[test]
fn non_drawing_tools_commit_nothing() {
    assert!(shape_from_drag(Tool::Eraser, p(0.0, 0.0), p(50.0, 50.0), vec![]).is_none());
    assert!(shape_from_drag(Tool::Text, p(0.0, 0.0), p(50.0, 50.0), vec![]).is_none());
}
