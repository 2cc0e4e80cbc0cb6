//! Sync client: the single owner of the local shape list.
//!
//! Every mutation of the board goes through [`SyncClient`], whether it comes
//! from a local gesture, a relay message from a peer, or the persisted event
//! log. The client never performs I/O itself; it returns the relay messages
//! the caller should send and accepts the outcome of remote calls.
//!
//! Local deletes are optimistic. [`SyncClient::begin_delete`] removes the
//! shape immediately and hands back a [`PendingMutation`]; once the remote
//! store answers, [`SyncClient::settle`] either confirms it (yielding the
//! `shape_deleted` broadcast) or applies the inverse mutation. All list
//! changes are keyed by shape id, so peers may append or remove shapes while
//! a delete is in flight.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use std::collections::HashMap;

use frames::{EventLog, RelayMessage, RoomId};

use crate::doc::{self, Shape, ShapeError, ShapeId, ShapeList};

/// Failure talking to the store or relay, or using a dead session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Transport failure or non-success response.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),
    /// The credential was rejected. Not retried.
    #[error("unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Malformed(#[from] ShapeError),
    /// The session was torn down before the operation ran.
    #[error("session torn down")]
    TornDown,
    /// A local commit reused an id already on the board.
    #[error("shape {0} already exists")]
    Duplicate(String),
}

// =============================================================
// Mutations
// =============================================================

/// A reversible change to the shape list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Put `shape` at `index` (clamped to the list length).
    Insert { index: usize, shape: Shape },
    /// Take `shape` out; `index` is where it sat, for restoring.
    Remove { index: usize, shape: Shape },
}

impl Mutation {
    /// Apply to `list`. Returns whether the list changed.
    pub fn apply(&self, list: &mut ShapeList) -> bool {
        match self {
            Self::Insert { index, shape } => list.insert(*index, shape.clone()),
            Self::Remove { shape, .. } => list.remove(&shape.id).is_some(),
        }
    }

    /// The mutation that undoes this one.
    #[must_use]
    pub fn invert(self) -> Self {
        match self {
            Self::Insert { index, shape } => Self::Remove { index, shape },
            Self::Remove { index, shape } => Self::Insert { index, shape },
        }
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Insert { shape, .. } | Self::Remove { shape, .. } => shape,
        }
    }
}

/// A locally applied mutation awaiting the remote store's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    mutation: Mutation,
}

impl PendingMutation {
    #[must_use]
    pub fn shape(&self) -> &Shape {
        self.mutation.shape()
    }

    #[must_use]
    pub fn shape_id(&self) -> &ShapeId {
        &self.mutation.shape().id
    }
}

/// Result of settling a [`PendingMutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The store accepted it; broadcast this message to peers.
    Confirmed(RelayMessage),
    /// The store refused it and the local list was restored.
    RolledBack,
    /// Nothing to do: the session is gone or a peer already made the change.
    Discarded,
}

// =============================================================
// Client
// =============================================================

/// Owns the shape list for one room.
#[derive(Debug)]
pub struct SyncClient {
    room_id: RoomId,
    shapes: ShapeList,
    /// Shapes with a delete in flight, flagged once a peer also removed them.
    in_flight: HashMap<ShapeId, bool>,
    torn_down: bool,
}

impl SyncClient {
    #[must_use]
    pub fn new(room_id: RoomId) -> Self {
        Self { room_id, shapes: ShapeList::new(), in_flight: HashMap::new(), torn_down: false }
    }

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    #[must_use]
    pub fn shapes(&self) -> &ShapeList {
        &self.shapes
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Replace the list with the shapes in a persisted event log, oldest
    /// first. Malformed events are skipped. Returns how many shapes loaded.
    pub fn load_initial(&mut self, log: &EventLog) -> usize {
        if self.torn_down {
            return 0;
        }
        let mut loaded = Vec::with_capacity(log.messages.len());
        for record in &log.messages {
            match doc::decode_event(&record.message) {
                Ok(shape) if self.in_flight.contains_key(&shape.id) => {}
                Ok(shape) => loaded.push(shape),
                Err(e) => log::warn!("skipping persisted event in room {}: {e}", self.room_id),
            }
        }
        self.shapes.replace_all(loaded);
        log::debug!("loaded {} shapes into room {}", self.shapes.len(), self.room_id);
        self.shapes.len()
    }

    /// Append a locally drawn shape and build the broadcast announcing it.
    ///
    /// # Errors
    ///
    /// [`SyncError::TornDown`] after teardown, [`SyncError::Duplicate`] if the
    /// id is already on the board, [`SyncError::Malformed`] if the shape fails
    /// validation. The list is untouched and nothing is broadcast on error.
    pub fn commit_local(&mut self, shape: Shape) -> Result<RelayMessage, SyncError> {
        if self.torn_down {
            return Err(SyncError::TornDown);
        }
        if self.shapes.contains(&shape.id) {
            return Err(SyncError::Duplicate(shape.id.to_string()));
        }
        let message = doc::encode_event(&shape)?;
        Mutation::Insert { index: self.shapes.len(), shape }.apply(&mut self.shapes);
        Ok(RelayMessage::Chat { room_id: Some(self.room_id.clone()), message })
    }

    /// Append a shape announced by a peer. Ids already present are ignored.
    pub fn on_remote_add(&mut self, shape: Shape) -> bool {
        if self.torn_down || self.in_flight.contains_key(&shape.id) {
            return false;
        }
        self.shapes.append(shape)
    }

    /// Remove a shape a peer deleted. Unknown ids are a no-op.
    pub fn on_remote_delete(&mut self, id: &ShapeId) -> bool {
        if self.torn_down {
            return false;
        }
        if let Some(superseded) = self.in_flight.get_mut(id) {
            *superseded = true;
        }
        self.shapes.remove(id).is_some()
    }

    /// Dispatch one inbound relay message. Returns whether the list changed.
    pub fn handle_inbound(&mut self, message: &RelayMessage) -> bool {
        match message {
            RelayMessage::Chat { message, .. } => match doc::decode_event(message) {
                Ok(shape) => self.on_remote_add(shape),
                Err(e) => {
                    log::warn!("ignoring malformed shape from peer: {e}");
                    false
                }
            },
            RelayMessage::ShapeDeleted { shape_id, .. } => self.on_remote_delete(&ShapeId::from(shape_id.as_str())),
            RelayMessage::JoinRoom { .. } | RelayMessage::Unknown => false,
        }
    }

    /// Optimistically remove `id`. Returns `None` if it is not on the board.
    pub fn begin_delete(&mut self, id: &ShapeId) -> Option<PendingMutation> {
        if self.torn_down {
            return None;
        }
        let (index, shape) = self.shapes.remove(id)?;
        self.in_flight.insert(shape.id.clone(), false);
        Some(PendingMutation { mutation: Mutation::Remove { index, shape } })
    }

    /// Resolve a pending delete with the store's answer.
    pub fn settle(&mut self, pending: PendingMutation, outcome: Result<(), SyncError>) -> Settlement {
        let superseded = self.in_flight.remove(pending.shape_id()).unwrap_or(false);
        if self.torn_down {
            return Settlement::Discarded;
        }
        match outcome {
            Ok(()) => Settlement::Confirmed(RelayMessage::ShapeDeleted {
                room_id: Some(self.room_id.clone()),
                shape_id: pending.shape_id().to_string(),
            }),
            Err(e) if superseded => {
                log::debug!("delete of {} failed after a peer removed it: {e}", pending.shape_id());
                Settlement::Discarded
            }
            Err(e) => {
                log::warn!("restoring {} after failed delete: {e}", pending.shape_id());
                pending.mutation.invert().apply(&mut self.shapes);
                Settlement::RolledBack
            }
        }
    }

    /// Stop accepting mutations. Later settles and inbound messages are no-ops.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.in_flight.clear();
    }
}
