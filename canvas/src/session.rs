//! Drawing session: wires the engine to a drawing surface, the shape store,
//! and the relay channel.
//!
//! The session is transport-agnostic. Hosts supply a [`ShapeApi`] for the
//! persisted event log, a [`RelaySink`] for outbound relay messages, and a
//! [`Surface`] to draw on; the browser uses fetch/WebSocket bindings, the
//! native CLI uses reqwest and tokio-tungstenite.
//!
//! Everything runs on one thread. The engine lives in an
//! `Rc<RefCell<EngineCore>>` and no borrow is held across an `.await`, so
//! inbound relay messages can be applied while a delete round trip is
//! pending.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, Ref, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use frames::{EventLog, RelayMessage, RoomId};

use crate::doc::ShapeId;
use crate::engine::{Action, EngineCore};
use crate::geom::Point;
use crate::input::Tool;
use crate::render::Surface;
use crate::sync::{PendingMutation, SyncError};

/// Access to the persisted event log.
#[async_trait(?Send)]
pub trait ShapeApi {
    /// Every persisted event for the room, oldest first.
    async fn fetch_events(&self, room_id: &RoomId) -> Result<EventLog, SyncError>;

    /// Remove the persisted event that created `shape_id`.
    async fn delete_shape(&self, room_id: &RoomId, shape_id: &ShapeId) -> Result<(), SyncError>;
}

/// Outbound half of the relay channel.
#[async_trait(?Send)]
pub trait RelaySink {
    async fn send(&self, message: &RelayMessage) -> Result<(), SyncError>;
}

/// State of the relay connection as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    /// The credential was rejected. The host must not retry silently.
    Blocked,
    Disconnected,
}

impl ConnectionStatus {
    /// Status implied by a failed relay or store call.
    #[must_use]
    pub fn after_error(error: &SyncError) -> Self {
        match error {
            SyncError::Unauthorized => Self::Blocked,
            _ => Self::Disconnected,
        }
    }
}

/// What the host must act on after an input has been processed.
#[derive(Debug, Default, PartialEq)]
pub struct Outcome {
    /// Text entry requests from the text tool, in order.
    pub text_requests: Vec<Point>,
    /// Cursor to show, if the tool changed.
    pub cursor: Option<String>,
    /// Failures to surface to the user. The board is already consistent.
    pub errors: Vec<SyncError>,
}

/// One room's drawing session.
pub struct DrawingSession<A, R, S> {
    core: Rc<RefCell<EngineCore>>,
    api: A,
    relay: R,
    surface: RefCell<S>,
    status: Cell<ConnectionStatus>,
}

impl<A, R, S> DrawingSession<A, R, S>
where
    A: ShapeApi,
    R: RelaySink,
    S: Surface,
    S::Error: fmt::Debug,
{
    pub fn new(room_id: RoomId, api: A, relay: R, surface: S) -> Self {
        Self {
            core: Rc::new(RefCell::new(EngineCore::new(room_id))),
            api,
            relay,
            surface: RefCell::new(surface),
            status: Cell::new(ConnectionStatus::Connecting),
        }
    }

    // --- Accessors ---

    /// Shared handle to the engine, for hosts that feed it directly.
    #[must_use]
    pub fn core(&self) -> Rc<RefCell<EngineCore>> {
        Rc::clone(&self.core)
    }

    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.core.borrow().sync.room_id().clone()
    }

    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.status.get()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        if self.status.get() != status {
            log::info!("room {}: connection {:?} -> {status:?}", self.room_id(), self.status.get());
            self.status.set(status);
        }
    }

    #[must_use]
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    #[must_use]
    pub fn relay(&self) -> &R {
        &self.relay
    }

    // --- Lifecycle ---

    /// Join the room on the relay, then load the persisted board.
    ///
    /// A failed load leaves an empty, working board and is reported in the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns the relay error if the join cannot be sent; the status is
    /// [`ConnectionStatus::Blocked`] for a rejected credential.
    pub async fn start(&self) -> Result<Outcome, SyncError> {
        self.set_status(ConnectionStatus::Connecting);
        let join = RelayMessage::JoinRoom { room_id: self.room_id() };
        if let Err(e) = self.relay.send(&join).await {
            self.set_status(ConnectionStatus::after_error(&e));
            return Err(e);
        }
        self.set_status(ConnectionStatus::Connected);
        Ok(self.load_initial().await)
    }

    /// Fetch the event log and rebuild the board from it. Also used to
    /// resync after a reconnect.
    pub async fn load_initial(&self) -> Outcome {
        let room_id = self.room_id();
        let mut outcome = Outcome::default();
        let log = match self.api.fetch_events(&room_id).await {
            Ok(log) => log,
            Err(e) => {
                log::warn!("room {room_id}: initial load failed: {e}");
                outcome.errors.push(e);
                EventLog::default()
            }
        };
        let actions = self.core.borrow_mut().load_initial(&log);
        self.dispatch(actions, &mut outcome).await;
        outcome
    }

    /// Detach from the room. Pending operations settle as no-ops.
    pub fn teardown(&self) {
        self.core.borrow_mut().teardown();
        self.set_status(ConnectionStatus::Disconnected);
    }

    // --- Inputs ---

    /// Apply one inbound relay message and redraw if the board changed.
    pub fn handle_inbound(&self, message: &RelayMessage) {
        let actions = self.core.borrow_mut().apply_inbound(message);
        if actions.contains(&Action::RenderNeeded) {
            self.render();
        }
    }

    pub async fn pointer_down(&self, pt: Point) -> Outcome {
        let actions = self.core.borrow_mut().on_pointer_down(pt);
        self.run(actions).await
    }

    pub async fn pointer_move(&self, pt: Point) -> Outcome {
        let actions = self.core.borrow_mut().on_pointer_move(pt);
        self.run(actions).await
    }

    pub async fn pointer_up(&self, pt: Point) -> Outcome {
        let actions = self.core.borrow_mut().on_pointer_up(pt);
        self.run(actions).await
    }

    pub async fn set_tool(&self, tool: Tool) -> Outcome {
        let actions = self.core.borrow_mut().set_tool(tool);
        self.run(actions).await
    }

    pub fn set_color(&self, color: &str) {
        self.core.borrow_mut().set_color(color);
    }

    pub async fn commit_text(&self, anchor: Point, text: &str) -> Outcome {
        let actions = self.core.borrow_mut().commit_text(anchor, text);
        self.run(actions).await
    }

    pub async fn set_viewport(&self, width: f64, height: f64) -> Outcome {
        let actions = self.core.borrow_mut().set_viewport(width, height);
        self.run(actions).await
    }

    /// Redraw the whole board. Surface failures are logged.
    pub fn render(&self) {
        let core = self.core.borrow();
        let mut surface = self.surface.borrow_mut();
        if let Err(e) = core.render(&mut *surface) {
            log::error!("render failed: {e:?}");
        }
    }

    // --- Action processing ---

    async fn run(&self, actions: Vec<Action>) -> Outcome {
        let mut outcome = Outcome::default();
        self.dispatch(actions, &mut outcome).await;
        outcome
    }

    async fn dispatch(&self, actions: Vec<Action>, outcome: &mut Outcome) {
        let mut queue: VecDeque<Action> = actions.into();
        let mut render = false;
        while let Some(action) = queue.pop_front() {
            match action {
                Action::Broadcast(message) => {
                    // Draw local changes before waiting on the relay.
                    if render {
                        self.render();
                        render = false;
                    }
                    if let Err(e) = self.relay.send(&message).await {
                        log::warn!("relay send of {} failed: {e}", message.kind());
                        self.set_status(ConnectionStatus::after_error(&e));
                        outcome.errors.push(e);
                    }
                }
                Action::DeleteRequested(pending) => {
                    // The shape is already gone locally; draw that before the round trip.
                    self.render();
                    render = false;
                    queue.extend(self.delete(pending, outcome).await);
                }
                Action::TextEntryRequested { anchor } => outcome.text_requests.push(anchor),
                Action::SetCursor(cursor) => outcome.cursor = Some(cursor),
                Action::RenderNeeded => render = true,
            }
        }
        if render {
            self.render();
        }
    }

    async fn delete(&self, pending: PendingMutation, outcome: &mut Outcome) -> Vec<Action> {
        let room_id = self.room_id();
        let shape_id = pending.shape_id().clone();
        let result = self.api.delete_shape(&room_id, &shape_id).await;
        let failure = result.as_ref().err().cloned();
        let actions = self.core.borrow_mut().settle_delete(pending, result);
        // A discarded settlement left the board unchanged.
        if let Some(e) = failure {
            if actions.contains(&Action::RenderNeeded) {
                log::warn!("room {room_id}: delete of {shape_id} failed: {e}");
                outcome.errors.push(e);
            } else {
                log::debug!("room {room_id}: delete of {shape_id} failed after it was settled elsewhere: {e}");
            }
        }
        actions
    }
}
