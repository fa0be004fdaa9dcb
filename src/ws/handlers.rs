//! WebSocket message dispatch
//!
//! Authorization is checked here, then dispatched to role-specific handler modules.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, GameError};
use crate::types::Role;
use std::sync::Arc;

use super::{host, player, Session};

/// Macro to check host authorization and return early if unauthorized
macro_rules! check_host {
    ($session:expr, $action:expr) => {
        if $session.role != Role::Host {
            return Some(ServerMessage::Error {
                code: "UNAUTHORIZED".to_string(),
                msg: format!("Only host can {}", $action),
            });
        }
    };
}

/// Turn a room service error into the error message sent to the client
pub fn game_error(e: GameError) -> ServerMessage {
    match &e {
        GameError::Store(_) => tracing::error!("Store failure: {}", e),
        _ => tracing::debug!("Rejected request: {}", e),
    }
    ServerMessage::error(e.code(), e.to_string())
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    session: &Session,
    state: &Arc<AppState>,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::SubmitAnswer { text } => {
            player::handle_submit_answer(state, session, text).await
        }

        ClientMessage::RequestState => match state.snapshot(&session.room).await {
            Ok(snapshot) => Some(ServerMessage::RoomState { state: snapshot }),
            Err(e) => Some(game_error(e)),
        },

        // Host-only commands (authorization checked before dispatch)
        ClientMessage::HostNewQuestion { question } => {
            check_host!(session, "publish questions");
            host::handle_new_question(state, session, question).await
        }

        ClientMessage::HostReveal => {
            check_host!(session, "reveal the herd");
            host::handle_reveal(state, session).await
        }

        ClientMessage::HostClearRoom => {
            check_host!(session, "clear the room");
            host::handle_clear_room(state, session).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            room: "r1".to_string(),
            player: "alice".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_host_messages_require_host() {
        let state = Arc::new(AppState::new());
        let player = session(Role::Player);

        for msg in [
            ClientMessage::HostNewQuestion { question: None },
            ClientMessage::HostReveal,
            ClientMessage::HostClearRoom,
        ] {
            let response = handle_message(msg, &player, &state).await;
            assert!(
                matches!(response, Some(ServerMessage::Error { ref code, .. }) if code == "UNAUTHORIZED")
            );
        }
    }

    #[tokio::test]
    async fn test_request_state() {
        let state = Arc::new(AppState::new());
        let response = handle_message(ClientMessage::RequestState, &session(Role::Player), &state).await;
        assert!(matches!(response, Some(ServerMessage::RoomState { state }) if state.room == "r1"));
    }
}
