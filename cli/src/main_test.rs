#![allow(clippy::float_cmp)]

use clap::CommandFactory;

use super::*;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parse_point_accepts_pairs() {
    assert_eq!(parse_point("10,20"), Ok(Point::new(10.0, 20.0)));
    assert_eq!(parse_point(" -3.5 , 4 "), Ok(Point::new(-3.5, 4.0)));
}

#[test]
fn parse_point_rejects_garbage() {
    assert!(parse_point("10").is_err());
    assert!(parse_point("a,b").is_err());
    assert!(parse_point("inf,0").is_err());
}

#[test]
fn backoff_doubles_up_to_cap() {
    let mut ms = INITIAL_BACKOFF_MS;
    let mut seen = Vec::new();
    for _ in 0..6 {
        seen.push(ms);
        ms = next_backoff(ms);
    }
    assert_eq!(seen, [1000, 2000, 4000, 8000, 10_000, 10_000]);
}

#[test]
fn only_network_failures_are_retried() {
    assert!(is_retryable(&CliError::Sync(SyncError::NetworkUnavailable("reset".into()))));
    assert!(!is_retryable(&CliError::Sync(SyncError::Unauthorized)));
    assert!(!is_retryable(&CliError::MissingToken));
}

#[test]
fn check_surfaces_first_error() {
    assert!(check(Outcome::default()).is_ok());
    let outcome = Outcome { errors: vec![SyncError::Unauthorized, SyncError::TornDown], ..Outcome::default() };
    assert!(matches!(check(outcome), Err(CliError::Sync(SyncError::Unauthorized))));
}

#[test]
fn describe_summarizes_board_changes() {
    let shape = doc::Shape::new(doc::ShapeKind::line(Point::new(0.0, 0.0), Point::new(1.0, 1.0)), "#abc");
    let added = RelayMessage::Chat { room_id: None, message: doc::encode_event(&shape).unwrap() };
    assert_eq!(describe(&added), Some(format!("+ {}\tline\t#abc", shape.id)));

    let removed = RelayMessage::ShapeDeleted { room_id: None, shape_id: "x".into() };
    assert_eq!(describe(&removed).as_deref(), Some("- x"));

    let garbage = RelayMessage::Chat { room_id: None, message: "nope".into() };
    assert!(describe(&garbage).unwrap().starts_with("? malformed shape"));

    assert_eq!(describe(&RelayMessage::Unknown), None);
}

#[test]
fn draw_arguments_parse() {
    let cli = Cli::try_parse_from([
        "whiteboard", "--token", "t", "draw", "42", "arrowRight", "--from", "0,0", "--via", "5,5", "--to", "-10,20",
    ])
    .unwrap();
    let Command::Draw(args) = cli.command else {
        panic!("expected draw");
    };
    assert_eq!(args.tool, Tool::Arrow);
    assert_eq!(args.from, Point::new(0.0, 0.0));
    assert_eq!(args.via, [Point::new(5.0, 5.0)]);
    assert_eq!(args.to, Some(Point::new(-10.0, 20.0)));
    assert_eq!(args.color, DEFAULT_COLOR);
}

#[test]
fn erase_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from(["whiteboard", "erase", "1", "-5", "7.5"]).unwrap();
    assert!(matches!(cli.command, Command::Erase { x, y, .. } if x == -5.0 && y == 7.5));
}

#[tokio::test]
async fn draw_rejects_eraser_and_missing_arguments_before_connecting() {
    let ctx = CliContext { base_url: "http://127.0.0.1:9".into(), token: None };
    let draw = |tool, to, text| DrawArgs {
        room: "1".into(),
        tool,
        from: Point::new(0.0, 0.0),
        to,
        via: Vec::new(),
        color: DEFAULT_COLOR.into(),
        text,
    };

    let err = run_draw(&ctx, draw(Tool::Eraser, None, None)).await.unwrap_err();
    assert!(matches!(err, CliError::Usage(m) if m.contains("erase")));
    let err = run_draw(&ctx, draw(Tool::Text, None, None)).await.unwrap_err();
    assert!(matches!(err, CliError::Usage(m) if m.contains("--text")));
    let err = run_draw(&ctx, draw(Tool::Rect, None, None)).await.unwrap_err();
    assert!(matches!(err, CliError::Usage(m) if m.contains("--to")));
    let err = run_draw(&ctx, draw(Tool::Rect, Some(Point::new(5.0, 5.0)), None)).await.unwrap_err();
    assert!(matches!(err, CliError::MissingToken));
}
