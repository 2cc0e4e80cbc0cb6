//! Room event-log routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use frames::{DeleteResponse, EventLog, RoomId};
use tracing::info;

use crate::state::AppState;
use crate::store::StoreError;

/// `GET /rooms/:room_id/events`: persisted events, oldest first.
pub async fn list_events(State(state): State<AppState>, Path(room_id): Path<String>) -> Json<EventLog> {
    Json(state.store.list(&RoomId::from(room_id)).await)
}

/// `DELETE /rooms/:room_id/shapes/:shape_id`: remove the event that created a shape.
pub async fn delete_shape(
    State(state): State<AppState>,
    Path((room_id, shape_id)): Path<(String, String)>,
) -> (StatusCode, Json<DeleteResponse>) {
    let room_id = RoomId::from(room_id);
    match state.store.delete_shape(&room_id, &shape_id).await {
        Ok(()) => {
            info!(%room_id, %shape_id, "rooms: shape deleted");
            (StatusCode::OK, Json(DeleteResponse { success: true, message: "Shape deleted successfully".into() }))
        }
        Err(e) => (store_error_to_status(&e), Json(DeleteResponse { success: false, message: e.to_string() })),
    }
}

fn store_error_to_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::ShapeNotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::EmptyMessage => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod rooms_test;
