use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use frames::{EventLog, RelayMessage, RoomId};

use crate::doc::{Shape, ShapeKind, ShapeList};
use crate::geom::Point;
use crate::hit;
use crate::input::{self, InputState, Tool, UiState};
use crate::render::{self, Preview, Surface};
use crate::sync::{PendingMutation, Settlement, SyncClient, SyncError};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this message on the relay channel.
    Broadcast(RelayMessage),
    /// Ask the store to delete a shape that was already removed locally,
    /// then hand the outcome to [`EngineCore::settle_delete`].
    DeleteRequested(PendingMutation),
    /// Collect text from the user, then call [`EngineCore::commit_text`].
    TextEntryRequested { anchor: Point },
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug)]
pub struct EngineCore {
    pub sync: SyncClient,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new(room_id: RoomId) -> Self {
        Self {
            sync: SyncClient::new(room_id),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
        }
    }

    // --- Data inputs ---

    /// Hydrate the board from the persisted event log.
    pub fn load_initial(&mut self, log: &EventLog) -> Vec<Action> {
        self.sync.load_initial(log);
        vec![Action::RenderNeeded]
    }

    /// Apply one message received from the relay.
    pub fn apply_inbound(&mut self, message: &RelayMessage) -> Vec<Action> {
        if self.sync.handle_inbound(message) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Resolve a delete previously returned as [`Action::DeleteRequested`].
    pub fn settle_delete(&mut self, pending: PendingMutation, outcome: Result<(), SyncError>) -> Vec<Action> {
        match self.sync.settle(pending, outcome) {
            Settlement::Confirmed(message) => vec![Action::Broadcast(message)],
            Settlement::RolledBack => vec![Action::RenderNeeded],
            Settlement::Discarded => Vec::new(),
        }
    }

    // --- Tool / color / text ---

    /// Set the active tool. A gesture already in progress keeps its own tool.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.ui.tool = tool;
        vec![Action::SetCursor(tool.cursor().to_owned())]
    }

    /// Set the color for the next gesture.
    pub fn set_color(&mut self, color: impl Into<String>) {
        self.ui.color = color.into();
    }

    /// Commit text collected after [`Action::TextEntryRequested`]. Blank text
    /// commits nothing.
    pub fn commit_text(&mut self, anchor: Point, text: &str) -> Vec<Action> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let shape = Shape::new(ShapeKind::text(anchor, text), self.ui.color.clone());
        self.commit(shape)
    }

    // --- Viewport ---

    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.viewport_width = width;
        self.viewport_height = height;
        vec![Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        if self.sync.is_torn_down() {
            return Vec::new();
        }
        match self.ui.tool {
            Tool::Eraser => {
                let Some(id) = hit::find_topmost_at(pt, self.sync.shapes()).map(|s| s.id.clone()) else {
                    return Vec::new();
                };
                match self.sync.begin_delete(&id) {
                    Some(pending) => vec![Action::DeleteRequested(pending), Action::RenderNeeded],
                    None => Vec::new(),
                }
            }
            Tool::Text => vec![Action::TextEntryRequested { anchor: pt }],
            tool => {
                self.input = InputState::begin(tool, &self.ui.color, pt);
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        if self.input.track(pt) {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        let InputState::Drawing { tool, color, origin, points, .. } = std::mem::take(&mut self.input) else {
            return Vec::new();
        };
        match input::shape_from_drag(tool, origin, pt, points) {
            Some(kind) => self.commit(Shape::new(kind, color)),
            None => vec![Action::RenderNeeded],
        }
    }

    /// Abandon the gesture in progress without committing anything.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        if self.input.is_idle() {
            return Vec::new();
        }
        self.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    /// Detach from the room. Later inputs and settlements are ignored.
    pub fn teardown(&mut self) {
        self.input = InputState::Idle;
        self.sync.teardown();
    }

    // --- Render ---

    /// Draw the board and any gesture preview.
    ///
    /// # Errors
    ///
    /// Propagates the first failing surface call.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<(), S::Error> {
        let preview = self.input.preview();
        render::draw(surface, self.sync.shapes(), preview.as_ref(), self.viewport_width, self.viewport_height)
    }

    // --- Queries ---

    #[must_use]
    pub fn shapes(&self) -> &ShapeList {
        self.sync.shapes()
    }

    #[must_use]
    pub fn preview(&self) -> Option<Preview> {
        self.input.preview()
    }

    fn commit(&mut self, shape: Shape) -> Vec<Action> {
        match self.sync.commit_local(shape) {
            Ok(message) => vec![Action::RenderNeeded, Action::Broadcast(message)],
            Err(e) => {
                log::warn!("dropping local shape: {e}");
                vec![Action::RenderNeeded]
            }
        }
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Fails if the element cannot provide a 2D context.
    pub fn new(canvas: HtmlCanvasElement, room_id: RoomId) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from(js_sys::Error::new("2d context unavailable")))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        let mut core = EngineCore::new(room_id);
        core.set_viewport(f64::from(canvas.width()), f64::from(canvas.height()));
        Ok(Self { canvas, ctx, core })
    }

    // --- Delegated data inputs ---

    pub fn load_initial(&mut self, log: &EventLog) -> Vec<Action> {
        self.core.load_initial(log)
    }

    pub fn apply_inbound(&mut self, message: &RelayMessage) -> Vec<Action> {
        self.core.apply_inbound(message)
    }

    pub fn settle_delete(&mut self, pending: PendingMutation, outcome: Result<(), SyncError>) -> Vec<Action> {
        self.core.settle_delete(pending, outcome)
    }

    /// Set the active tool and update the canvas cursor.
    ///
    /// # Errors
    ///
    /// Fails if the cursor style cannot be set.
    pub fn set_tool(&mut self, tool: Tool) -> Result<Vec<Action>, JsValue> {
        let actions = self.core.set_tool(tool);
        self.canvas.style().set_property("cursor", tool.cursor())?;
        Ok(actions)
    }

    pub fn set_color(&mut self, color: &str) {
        self.core.set_color(color);
    }

    pub fn commit_text(&mut self, anchor: Point, text: &str) -> Vec<Action> {
        self.core.commit_text(anchor, text)
    }

    // --- Viewport ---

    /// Resize the backing store to the given CSS size.
    pub fn set_viewport(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.canvas.set_width(pixels(width));
        self.canvas.set_height(pixels(height));
        self.core.set_viewport(width, height)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_down(pt)
    }

    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(pt)
    }

    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        self.core.on_pointer_up(pt)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.core.on_pointer_cancel()
    }

    pub fn teardown(&mut self) {
        self.core.teardown();
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Propagates any failing `Canvas2D` call.
    pub fn render(&mut self) -> Result<(), JsValue> {
        self.core.render(&mut self.ctx)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn shapes(&self) -> &ShapeList {
        self.core.shapes()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixels(css: f64) -> u32 {
    css.max(0.0).round() as u32
}
