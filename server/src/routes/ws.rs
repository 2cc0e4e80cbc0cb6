//! WebSocket handler: room-scoped relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client messages → decode + dispatch by `type`
//! - Messages relayed from room peers → forward to client
//!
//! Handler functions validate, update state, and return an `Outcome`. The
//! dispatch layer owns outbound concerns. Relayed messages never go back to
//! their sender, and the protocol has no error replies: rejected input is
//! logged and dropped.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade (credential checked first, 401 on reject)
//! 2. Client sends `join_room` → registered in that room
//! 3. `chat` → persisted, relayed to peers; `shape_deleted` → relayed to peers
//! 4. Close → removed from its room

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use frames::{RelayMessage, RoomId};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by handler functions. The dispatch layer uses this to
/// decide who receives what; handlers never send directly.
#[derive(Debug)]
enum Outcome {
    /// Relay to every peer in the room, excluding the sender.
    BroadcastExcludeSender { room_id: RoomId, message: RelayMessage },
    /// Nothing to relay.
    Done,
}

// =============================================================================
// UPGRADE
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct WsParams {
    token: Option<String>,
}

pub async fn handle_ws(State(state): State<AppState>, Query(params): Query<WsParams>, ws: WebSocketUpgrade) -> Response {
    let Some(token) = params.token else {
        return (StatusCode::UNAUTHORIZED, "token required").into_response();
    };
    if !state.config.accepts(&token) {
        warn!("ws: rejected credential");
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }

    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for messages relayed from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<RelayMessage>(state.config.channel_capacity);

    info!(%client_id, "ws: client connected");

    let mut current_room: Option<RoomId> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        process_inbound_text(&state, &mut current_room, client_id, &client_tx, text.as_str()).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(message) = client_rx.recv() => {
                if send_message(&mut socket, &message).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(room_id) = current_room {
        state.part(&room_id, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

async fn send_message(socket: &mut WebSocket, message: &RelayMessage) -> Result<(), axum::Error> {
    match frames::encode_message(message) {
        Ok(text) => socket.send(Message::Text(text.into())).await,
        Err(e) => {
            warn!(error = %e, kind = message.kind(), "ws: failed to encode outbound message");
            Ok(())
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Decode and process one inbound text message, applying its outcome.
async fn process_inbound_text(
    state: &AppState,
    current_room: &mut Option<RoomId>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<RelayMessage>,
    text: &str,
) {
    let message = match frames::decode_message(text) {
        Ok(m) => m,
        Err(e) => {
            warn!(%client_id, error = %e, "ws: invalid inbound message");
            return;
        }
    };

    debug!(%client_id, kind = message.kind(), "ws: recv message");

    let result = match message {
        RelayMessage::JoinRoom { room_id } => Ok(handle_join(state, current_room, client_id, client_tx, room_id).await),
        RelayMessage::Chat { room_id, message } => handle_chat(state, current_room.as_ref(), room_id, message).await,
        RelayMessage::ShapeDeleted { room_id, shape_id } => handle_shape_deleted(current_room.as_ref(), room_id, shape_id),
        RelayMessage::Unknown => {
            warn!(%client_id, "ws: ignoring message of unknown type");
            Ok(Outcome::Done)
        }
    };

    match result {
        Ok(Outcome::BroadcastExcludeSender { room_id, message }) => {
            let delivered = state.broadcast(&room_id, &message, Some(client_id)).await;
            debug!(%client_id, %room_id, kind = message.kind(), delivered, "ws: relayed");
        }
        Ok(Outcome::Done) => {}
        Err(reason) => warn!(%client_id, %reason, "ws: rejected message"),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn handle_join(
    state: &AppState,
    current_room: &mut Option<RoomId>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<RelayMessage>,
    room_id: RoomId,
) -> Outcome {
    if let Some(old_room) = current_room.take() {
        state.part(&old_room, client_id).await;
    }
    state.join(&room_id, client_id, client_tx.clone()).await;
    let members = state.member_count(&room_id).await;
    info!(%client_id, %room_id, members, "ws: joined room");
    *current_room = Some(room_id);
    Outcome::Done
}

async fn handle_chat(
    state: &AppState,
    current_room: Option<&RoomId>,
    named_room: Option<RoomId>,
    message: String,
) -> Result<Outcome, String> {
    let room_id = target_room(current_room, named_room.as_ref())?;
    state.store.append(&room_id, &message).await.map_err(|e| e.to_string())?;
    Ok(Outcome::BroadcastExcludeSender {
        message: RelayMessage::Chat { room_id: Some(room_id.clone()), message },
        room_id,
    })
}

fn handle_shape_deleted(
    current_room: Option<&RoomId>,
    named_room: Option<RoomId>,
    shape_id: String,
) -> Result<Outcome, String> {
    let room_id = target_room(current_room, named_room.as_ref())?;
    Ok(Outcome::BroadcastExcludeSender {
        message: RelayMessage::ShapeDeleted { room_id: Some(room_id.clone()), shape_id },
        room_id,
    })
}

/// Room a message applies to: the joined room. A message naming any other
/// room is rejected.
fn target_room(current_room: Option<&RoomId>, named_room: Option<&RoomId>) -> Result<RoomId, String> {
    let Some(current) = current_room else {
        return Err("must join a room first".into());
    };
    match named_room {
        Some(named) if named != current => Err(format!("not joined to room {named}")),
        _ => Ok(current.clone()),
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;
