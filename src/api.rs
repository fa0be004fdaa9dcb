//! HTTP API endpoints for clients that poll instead of keeping a socket open.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::state::{AppState, GameError};
use crate::store::StoreError;

/// Suggested code for a new room
#[derive(Debug, Clone, Serialize)]
pub struct RoomCodeResponse {
    pub room: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            GameError::Store(e) => {
                tracing::error!("Store failure: {}", e);
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::CONFLICT,
        };
        let body = Json(serde_json::json!({
            "code": self.code(),
            "msg": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Current state of a room.
///
/// GET /api/rooms/{room}
pub async fn get_room_state(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Response, GameError> {
    let snapshot = state.snapshot(&room).await?;
    Ok(Json(snapshot).into_response())
}

/// Leaderboard of a room.
///
/// GET /api/rooms/{room}/scores
pub async fn get_scores(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
) -> Result<Response, GameError> {
    let scores = state.get_scores(&room).await?;
    Ok(Json(scores).into_response())
}

/// Suggest a human-friendly room code.
///
/// GET /api/room-code
pub async fn suggest_room_code() -> Json<RoomCodeResponse> {
    let room = petname::petname(2, "-")
        .unwrap_or_else(|| ulid::Ulid::new().to_string().to_lowercase());
    Json(RoomCodeResponse { room })
}
