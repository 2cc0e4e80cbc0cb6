//! Per-room event log.
//!
//! DESIGN
//! ======
//! Each room keeps the `chat` payloads it has relayed, in arrival order.
//! Payloads are stored as opaque JSON text; the store only looks inside to
//! find `shape.id` when a shape is deleted. Rooms are created on first
//! append and never evicted.

use std::collections::HashMap;

use frames::{EventLog, EventRecord, RoomId};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("event message is empty")]
    EmptyMessage,
    #[error("shape {shape_id} not found in room {room_id}")]
    ShapeNotFound { room_id: RoomId, shape_id: String },
}

#[derive(Debug, Default)]
pub struct EventStore {
    rooms: RwLock<HashMap<RoomId, Vec<EventRecord>>>,
}

impl EventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one relayed message to the room's log.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyMessage`] for blank payloads.
    pub async fn append(&self, room_id: &RoomId, message: &str) -> Result<(), StoreError> {
        if message.trim().is_empty() {
            return Err(StoreError::EmptyMessage);
        }
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id.clone())
            .or_default()
            .push(EventRecord { message: message.to_owned() });
        Ok(())
    }

    /// Every event for the room, oldest first. Unknown rooms are empty.
    pub async fn list(&self, room_id: &RoomId) -> EventLog {
        let rooms = self.rooms.read().await;
        EventLog { messages: rooms.get(room_id).cloned().unwrap_or_default() }
    }

    /// Remove the first event whose payload carries `shape.id == shape_id`.
    /// Events that are not shape payloads are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShapeNotFound`] when no event matches.
    pub async fn delete_shape(&self, room_id: &RoomId, shape_id: &str) -> Result<(), StoreError> {
        let mut rooms = self.rooms.write().await;
        let not_found = || StoreError::ShapeNotFound { room_id: room_id.clone(), shape_id: shape_id.to_owned() };
        let events = rooms.get_mut(room_id).ok_or_else(not_found)?;
        let index = events
            .iter()
            .position(|e| frames::shape_id_of(&e.message).as_deref() == Some(shape_id))
            .ok_or_else(not_found)?;
        events.remove(index);
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
