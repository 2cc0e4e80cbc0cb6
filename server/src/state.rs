//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the relay config, the event store, and the live room membership:
//! each room maps connected client ids to the sender half of that client's
//! outbound channel. A client belongs to at most one room at a time.

use std::collections::HashMap;
use std::sync::Arc;

use frames::{RelayMessage, RoomId};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::warn;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::store::EventStore;

/// Connected clients of one room: `client_id` -> sender for relayed messages.
pub type RoomClients = HashMap<Uuid, mpsc::Sender<RelayMessage>>;

/// Shared application state. Clone is required by Axum; all fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub store: Arc<EventStore>,
    pub rooms: Arc<RwLock<HashMap<RoomId, RoomClients>>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: RelayConfig) -> Self {
        Self { config: Arc::new(config), store: Arc::new(EventStore::new()), rooms: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Register a client in a room.
    pub async fn join(&self, room_id: &RoomId, client_id: Uuid, tx: mpsc::Sender<RelayMessage>) {
        let mut rooms = self.rooms.write().await;
        rooms.entry(room_id.clone()).or_default().insert(client_id, tx);
    }

    /// Remove a client from a room. Empty rooms are evicted.
    pub async fn part(&self, room_id: &RoomId, client_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        if let Some(clients) = rooms.get_mut(room_id) {
            clients.remove(&client_id);
            if clients.is_empty() {
                rooms.remove(room_id);
            }
        }
    }

    /// Number of clients currently in a room.
    pub async fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.read().await.get(room_id).map_or(0, HashMap::len)
    }

    /// Send a message to every client in a room except `exclude`.
    ///
    /// Best-effort: a peer whose channel is full or closed is skipped. Returns
    /// the number of peers the message was queued for.
    pub async fn broadcast(&self, room_id: &RoomId, message: &RelayMessage, exclude: Option<Uuid>) -> usize {
        let rooms = self.rooms.read().await;
        let Some(clients) = rooms.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (client_id, tx) in clients {
            if exclude == Some(*client_id) {
                continue;
            }
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(%room_id, %client_id, kind = message.kind(), "relay: peer channel full, dropping message");
                }
                Err(TrySendError::Closed(_)) => {}
            }
        }
        delivered
    }
}


#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;
