pub mod handlers;
pub mod host;
pub mod player;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage, PROTOCOL_VERSION};
use crate::state::AppState;
use crate::store::validate_key;
use crate::types::{PlayerId, Role, RoomId};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room: String,
    pub player: String,
    pub role: Option<String>,
}

/// Who is on the other end of a socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub room: RoomId,
    pub player: PlayerId,
    pub role: Role,
}

impl Session {
    /// Validate the connect parameters. The host role is self-declared.
    pub fn from_query(params: &WsQuery) -> Result<Self, ServerMessage> {
        let invalid = |e: crate::store::StoreError| ServerMessage::error("INVALID_KEY", e.to_string());
        let role = match params.role.as_deref() {
            Some("host") => Role::Host,
            _ => Role::Player,
        };
        Ok(Self {
            room: validate_key(&params.room).map_err(invalid)?,
            player: validate_key(&params.player).map_err(invalid)?,
            role,
        })
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    tracing::info!(
        "WebSocket connection request: room={}, player={}, role={:?}",
        params.room,
        params.player,
        params.role
    );

    ws.on_upgrade(move |socket| handle_socket(socket, params, state))
}

async fn send_json(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, params: WsQuery, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let session = match Session::from_query(&params) {
        Ok(session) => session,
        Err(error) => {
            let _ = send_json(&mut sender, &error).await;
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };

    tracing::info!(
        "WebSocket connected: room={}, player={}, role={:?}",
        session.room,
        session.player,
        session.role
    );

    // Subscribe before loading the snapshot so no update is missed in between
    let mut room_rx = state.subscribe(&session.room).await;

    let welcome = match state.snapshot(&session.room).await {
        Ok(snapshot) => ServerMessage::Welcome {
            protocol: PROTOCOL_VERSION.to_string(),
            role: session.role,
            room: session.room.clone(),
            player: session.player.clone(),
            poll_interval_ms: state.poll_interval.as_millis() as u64,
            state: snapshot,
        },
        Err(e) => handlers::game_error(e),
    };

    if send_json(&mut sender, &welcome).await.is_err() {
        tracing::error!("Failed to send welcome message");
        return;
    }

    loop {
        tokio::select! {
            // Room broadcasts
            room_msg = room_rx.recv() => {
                match room_msg {
                    Ok(msg) => {
                        if send_json(&mut sender, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Client in room {} lagged by {} messages", session.room, skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            // Client messages
            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        let response = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => handlers::handle_message(client_msg, &session, &state).await,
                            Err(e) => {
                                tracing::error!("Failed to parse client message: {}", e);
                                Some(ServerMessage::error(
                                    "PARSE_ERROR",
                                    format!("Invalid message format: {}", e),
                                ))
                            }
                        };
                        if let Some(response) = response {
                            if send_json(&mut sender, &response).await.is_err() {
                                tracing::error!("Failed to send response");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    tracing::info!(
        "WebSocket connection closed: room={}, player={}",
        session.room,
        session.player
    );
}
