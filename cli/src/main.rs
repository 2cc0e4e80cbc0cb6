mod net;
mod svg;

use std::path::PathBuf;
use std::time::Duration;

use canvas::consts::DEFAULT_COLOR;
use canvas::doc;
use canvas::engine::EngineCore;
use canvas::geom::Point;
use canvas::hit;
use canvas::input::Tool;
use canvas::session::{DrawingSession, Outcome, ShapeApi};
use canvas::sync::SyncError;
use clap::{Args, Parser, Subcommand};
use frames::{RelayMessage, RoomId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::net::{HttpShapeApi, RelayStream, WsRelay};
use crate::svg::SvgSurface;

const INITIAL_BACKOFF_MS: u64 = 1000;
const MAX_BACKOFF_MS: u64 = 10_000;
const SESSION_WIDTH: f64 = 1280.0;
const SESSION_HEIGHT: f64 = 720.0;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing token; pass --token or set WHITEBOARD_TOKEN")]
    MissingToken,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("{0}")]
    Usage(&'static str),
}

#[derive(Parser, Debug)]
#[command(name = "whiteboard", about = "Collaborative whiteboard client")]
struct Cli {
    #[arg(long, env = "WHITEBOARD_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[arg(long, env = "WHITEBOARD_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server health endpoint.
    Ping,
    /// List the persisted shapes of a room, oldest first.
    Events {
        room: String,
        /// Print the raw event log instead of one line per shape.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Draw one shape into a room.
    Draw(DrawArgs),
    /// Erase the topmost shape at a point.
    Erase {
        room: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Follow a room's changes, reconnecting with backoff.
    Watch { room: String },
    /// Render a room to an SVG file.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct DrawArgs {
    room: String,

    /// pencil, rect, circle, line, arrow, or text.
    tool: Tool,

    /// Pointer-down position, `x,y`.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    from: Point,

    /// Pointer-up position, `x,y`. Not used by the text tool.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    to: Option<Point>,

    /// Intermediate pointer positions, in order.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    via: Vec<Point>,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    /// Content for the text tool.
    #[arg(long)]
    text: Option<String>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    room: String,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value_t = SESSION_WIDTH)]
    width: f64,

    #[arg(long, default_value_t = SESSION_HEIGHT)]
    height: f64,
}

type Session = DrawingSession<HttpShapeApi, WsRelay, SvgSurface>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url, token: cli.token };

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Events { room, json } => run_events(&ctx, &RoomId::from(room), json).await,
        Command::Draw(args) => run_draw(&ctx, args).await,
        Command::Erase { room, x, y } => run_erase(&ctx, &RoomId::from(room), Point::new(x, y)).await,
        Command::Watch { room } => run_watch(&ctx, &RoomId::from(room)).await,
        Command::Export(args) => run_export(&ctx, args).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let url = format!("{}/healthz", ctx.base_url.trim_end_matches('/'));
    let status = reqwest::get(url).await?.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_events(ctx: &CliContext, room: &RoomId, json: bool) -> Result<(), CliError> {
    let log = HttpShapeApi::new(&ctx.base_url).fetch_events(room).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
        return Ok(());
    }
    for record in &log.messages {
        match doc::decode_event(&record.message) {
            Ok(shape) => println!("{}\t{}\t{}", shape.id, shape.kind.type_name(), shape.color),
            Err(e) => warn!(%room, error = %e, "skipping malformed event"),
        }
    }
    Ok(())
}

/// What `draw` does after pointer-down.
enum Gesture {
    Text(String),
    Drag { via: Vec<Point>, to: Point },
}

async fn run_draw(ctx: &CliContext, args: DrawArgs) -> Result<(), CliError> {
    let gesture = match args.tool {
        Tool::Eraser => return Err(CliError::Usage("use `erase` to remove shapes")),
        Tool::Text => Gesture::Text(args.text.ok_or(CliError::Usage("--text is required for the text tool"))?),
        _ => Gesture::Drag { via: args.via, to: args.to.ok_or(CliError::Usage("--to is required for drawing tools"))? },
    };
    let room = RoomId::from(args.room);
    let session = open_session(ctx, &room).await?;

    session.set_color(&args.color);
    check(session.set_tool(args.tool).await)?;
    let before = session.core().borrow().shapes().len();

    let result = perform(&session, args.from, gesture).await;
    session.relay().close().await;
    result?;

    let core = session.core();
    let core = core.borrow();
    match core.shapes().iter().next_back() {
        Some(shape) if core.shapes().len() > before => {
            println!("{}", shape.id);
            Ok(())
        }
        _ => Err(CliError::Usage("gesture too short; nothing was drawn")),
    }
}

async fn perform(session: &Session, from: Point, gesture: Gesture) -> Result<(), CliError> {
    match gesture {
        Gesture::Text(text) => {
            let outcome = session.pointer_down(from).await;
            let anchors = outcome.text_requests.clone();
            check(outcome)?;
            for anchor in anchors {
                check(session.commit_text(anchor, &text).await)?;
            }
        }
        Gesture::Drag { via, to } => {
            check(session.pointer_down(from).await)?;
            for pt in via {
                check(session.pointer_move(pt).await)?;
            }
            check(session.pointer_move(to).await)?;
            check(session.pointer_up(to).await)?;
        }
    }
    Ok(())
}

async fn run_erase(ctx: &CliContext, room: &RoomId, pt: Point) -> Result<(), CliError> {
    let session = open_session(ctx, room).await?;
    check(session.set_tool(Tool::Eraser).await)?;

    let target = hit::find_topmost_at(pt, session.core().borrow().shapes()).map(|s| s.id.clone());
    let result = check(session.pointer_down(pt).await);
    session.relay().close().await;
    result?;

    match target {
        Some(id) => println!("erased {id}"),
        None => println!("nothing to erase at ({}, {})", pt.x, pt.y),
    }
    Ok(())
}

async fn run_watch(ctx: &CliContext, room: &RoomId) -> Result<(), CliError> {
    let mut backoff_ms = INITIAL_BACKOFF_MS;
    loop {
        match watch_once(ctx, room, &mut backoff_ms).await {
            Ok(()) => info!(%room, "relay closed"),
            Err(e) if is_retryable(&e) => warn!(%room, error = %e, backoff_ms, "watch: connection lost"),
            Err(e) => return Err(e),
        }
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = next_backoff(backoff_ms);
    }
}

/// One connection's worth of watching. Reconnecting starts a fresh session,
/// which reloads the whole board.
async fn watch_once(ctx: &CliContext, room: &RoomId, backoff_ms: &mut u64) -> Result<(), CliError> {
    let (session, mut stream) = open_watch_session(ctx, room).await?;
    *backoff_ms = INITIAL_BACKOFF_MS;
    println!("watching room {room}: {} shapes", session.core().borrow().shapes().len());

    while let Some(message) = stream.next().await {
        let message = message?;
        if let Some(line) = describe(&message) {
            println!("{line}");
        }
        session.handle_inbound(&message);
    }
    session.teardown();
    Ok(())
}

async fn run_export(ctx: &CliContext, args: ExportArgs) -> Result<(), CliError> {
    let room = RoomId::from(args.room);
    let log = HttpShapeApi::new(&ctx.base_url).fetch_events(&room).await?;

    let mut core = EngineCore::new(room);
    core.load_initial(&log);
    core.set_viewport(args.width, args.height);
    let mut surface = SvgSurface::new(args.width, args.height);
    let Ok(()) = core.render(&mut surface);

    std::fs::write(&args.out, surface.finish()).map_err(|source| CliError::Write { path: args.out.clone(), source })?;
    println!("wrote {} shapes to {}", core.shapes().len(), args.out.display());
    Ok(())
}

// =============================================================================
// SESSION
// =============================================================================

async fn open_session(ctx: &CliContext, room: &RoomId) -> Result<Session, CliError> {
    let (session, _stream) = open_watch_session(ctx, room).await?;
    Ok(session)
}

/// Connect the relay, join the room, and load the board.
async fn open_watch_session(ctx: &CliContext, room: &RoomId) -> Result<(Session, RelayStream), CliError> {
    let token = ctx.token.as_deref().ok_or(CliError::MissingToken)?;
    let url = net::ws_url(&ctx.base_url, token).ok_or_else(|| CliError::InvalidBaseUrl(ctx.base_url.clone()))?;
    let (relay, stream) = WsRelay::connect(&url).await?;

    let session = DrawingSession::new(
        room.clone(),
        HttpShapeApi::new(&ctx.base_url),
        relay,
        SvgSurface::new(SESSION_WIDTH, SESSION_HEIGHT),
    );
    session.set_viewport(SESSION_WIDTH, SESSION_HEIGHT).await;
    check(session.start().await?)?;
    Ok((session, stream))
}

/// Surface the first failure reported by a session call.
fn check(outcome: Outcome) -> Result<(), CliError> {
    match outcome.errors.into_iter().next() {
        Some(e) => Err(CliError::Sync(e)),
        None => Ok(()),
    }
}

fn is_retryable(err: &CliError) -> bool {
    matches!(err, CliError::Sync(SyncError::NetworkUnavailable(_)))
}

fn next_backoff(current_ms: u64) -> u64 {
    current_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

/// One-line summary of a relayed change, or `None` for messages that do not
/// change the board.
fn describe(message: &RelayMessage) -> Option<String> {
    match message {
        RelayMessage::Chat { message, .. } => Some(match doc::decode_event(message) {
            Ok(shape) => format!("+ {}\t{}\t{}", shape.id, shape.kind.type_name(), shape.color),
            Err(e) => format!("? malformed shape: {e}"),
        }),
        RelayMessage::ShapeDeleted { shape_id, .. } => Some(format!("- {shape_id}")),
        RelayMessage::JoinRoom { .. } | RelayMessage::Unknown => None,
    }
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected `x,y`, got {raw:?}"))?;
    let parse = |v: &str| v.trim().parse::<f64>().map_err(|e| format!("invalid coordinate {v:?}: {e}"));
    let pt = Point::new(parse(x)?, parse(y)?);
    if !pt.is_finite() {
        return Err(format!("coordinates must be finite, got {raw:?}"));
    }
    Ok(pt)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;
