//! Host-only command handlers
//!
//! Authorization is checked in the main dispatch layer before calling these.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::Question;
use std::sync::Arc;

use super::handlers::game_error;
use super::Session;

pub async fn handle_new_question(
    state: &Arc<AppState>,
    session: &Session,
    question: Option<Question>,
) -> Option<ServerMessage> {
    tracing::info!("Host {} publishing a question in room {}", session.player, session.room);
    match state.publish_question(&session.room, question).await {
        Ok((round, question)) => {
            let paths = state.paths(&session.room).ok()?;
            let roster = match state.load_roster(&paths).await {
                Ok(roster) => roster,
                Err(e) => return Some(game_error(e)),
            };
            let published = ServerMessage::QuestionPublished {
                answer_mode: question.answer_mode(&roster),
                round,
                question,
            };
            state.broadcast_to_room(&session.room, published.clone()).await;
            state.broadcast_room_state(&session.room).await;
            Some(published)
        }
        Err(e) => Some(game_error(e)),
    }
}

pub async fn handle_reveal(state: &Arc<AppState>, session: &Session) -> Option<ServerMessage> {
    tracing::info!("Host {} revealing the herd in room {}", session.player, session.room);
    match state.reveal(&session.room).await {
        Ok(result) => {
            let revealed = ServerMessage::HerdRevealed { result };
            state.broadcast_to_room(&session.room, revealed.clone()).await;
            state.broadcast_room_state(&session.room).await;
            Some(revealed)
        }
        Err(e) => Some(game_error(e)),
    }
}

pub async fn handle_clear_room(state: &Arc<AppState>, session: &Session) -> Option<ServerMessage> {
    tracing::info!("Host {} clearing room {}", session.player, session.room);
    match state.clear_room(&session.room).await {
        Ok(()) => {
            state
                .broadcast_to_room(&session.room, ServerMessage::RoomCleared)
                .await;
            state.broadcast_room_state(&session.room).await;
            Some(ServerMessage::RoomCleared)
        }
        Err(e) => Some(game_error(e)),
    }
}
