//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the event-log REST endpoints and the relay websocket under one Axum
//! router. Browser clients are served from other origins, so CORS is open.

pub mod rooms;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/rooms/{room_id}/events", get(rooms::list_events))
        .route("/rooms/{room_id}/shapes/{shape_id}", delete(rooms::delete_shape))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
