//! Player message handlers

use crate::protocol::ServerMessage;
use crate::state::AppState;
use std::sync::Arc;

use super::handlers::game_error;
use super::Session;

pub async fn handle_submit_answer(
    state: &Arc<AppState>,
    session: &Session,
    text: String,
) -> Option<ServerMessage> {
    match state
        .submit_answer(&session.room, &session.player, &text)
        .await
    {
        Ok(text) => {
            state.broadcast_room_state(&session.room).await;
            Some(ServerMessage::AnswerAccepted { text })
        }
        Err(e) => Some(game_error(e)),
    }
}
