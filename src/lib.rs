// Public API for integration tests and potential library usage

pub mod api;
pub mod config;
pub mod herd;
pub mod protocol;
pub mod questions;
pub mod state;
pub mod store;
pub mod types;
pub mod ws;

pub mod broadcast;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// All HTTP and WebSocket routes
pub fn router(state: Arc<state::AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/rooms/{room}", get(api::get_room_state))
        .route("/api/rooms/{room}/scores", get(api::get_scores))
        .route("/api/room-code", get(api::suggest_room_code))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
