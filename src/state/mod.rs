mod room;
mod round;
mod score;

use crate::config::AppConfig;
use crate::herd::{HerdEngine, HerdError};
use crate::protocol::{RoomSnapshot, ServerMessage};
use crate::questions::QuestionBank;
use crate::store::{MemoryStore, RoomPaths, RoomStore, StoreError, DEFAULT_ROOT};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};

/// Buffered messages per room channel before slow subscribers start lagging
const ROOM_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    Herd(#[from] HerdError),

    #[error("Invalid phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: RoomPhase, to: RoomPhase },

    #[error("Answers are closed while the room is in {0:?}")]
    AnswersClosed(RoomPhase),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    /// Stable error code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Herd(HerdError::InsufficientAnswers(_)) => "INSUFFICIENT_ANSWERS",
            GameError::Herd(HerdError::InvalidThreshold(_)) => "INVALID_THRESHOLD",
            GameError::InvalidTransition { .. } => "INVALID_TRANSITION",
            GameError::AnswersClosed(_) => "ANSWERS_CLOSED",
            GameError::Store(StoreError::InvalidKey(_)) => "INVALID_KEY",
            GameError::Store(StoreError::Malformed { .. }) => "MALFORMED_STATE",
            GameError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub engine: HerdEngine,
    pub room_root: String,
    pub poll_interval: Duration,
    /// Bank every room's deck is copied from
    question_bank: Arc<QuestionBank>,
    /// Remaining questions per room
    decks: Arc<RwLock<HashMap<RoomId, QuestionBank>>>,
    /// Push channels for clients connected to a room
    channels: Arc<RwLock<HashMap<RoomId, broadcast::Sender<ServerMessage>>>>,
    /// Last snapshot pushed to each watched room
    pushed: Arc<RwLock<HashMap<RoomId, RoomSnapshot>>>,
}

impl AppState {
    /// In-memory state with default settings and an empty question bank
    pub fn new() -> Self {
        let config = AppConfig::default();
        Self {
            store: Arc::new(MemoryStore::new()),
            engine: HerdEngine::default(),
            room_root: DEFAULT_ROOT.to_string(),
            poll_interval: config.poll_interval,
            question_bank: Arc::new(QuestionBank::default()),
            decks: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
            pushed: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn RoomStore>,
        question_bank: QuestionBank,
    ) -> Result<Self, HerdError> {
        Ok(Self {
            store,
            engine: config.engine()?,
            room_root: config.room_root.clone(),
            poll_interval: config.poll_interval,
            question_bank: Arc::new(question_bank),
            decks: Arc::new(RwLock::new(HashMap::new())),
            channels: Arc::new(RwLock::new(HashMap::new())),
            pushed: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub fn with_question_bank(mut self, question_bank: QuestionBank) -> Self {
        self.question_bank = Arc::new(question_bank);
        self
    }

    pub fn with_engine(mut self, engine: HerdEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Validated key layout for a room
    pub fn paths(&self, room: &str) -> Result<RoomPaths, GameError> {
        Ok(RoomPaths::new(&self.room_root, room)?)
    }

    /// Subscribe to pushes for a room
    pub async fn subscribe(&self, room: &str) -> broadcast::Receiver<ServerMessage> {
        let mut channels = self.channels.write().await;
        channels
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Push a message to every client in a room
    pub async fn broadcast_to_room(&self, room: &str, msg: ServerMessage) {
        if let Some(tx) = self.channels.read().await.get(room) {
            // No receivers connected is fine
            let _ = tx.send(msg);
        }
    }

    /// Push a fresh snapshot of the room to its clients
    pub async fn broadcast_room_state(&self, room: &str) {
        match self.snapshot(room).await {
            Ok(state) => {
                self.push_snapshot(room, state).await;
            }
            Err(e) => tracing::error!("Failed to load state of room {}: {}", room, e),
        }
    }

    /// Broadcast `snapshot` unless it is the one last pushed to the room.
    /// Returns whether anything was sent.
    pub async fn push_snapshot(&self, room: &str, snapshot: RoomSnapshot) -> bool {
        {
            let mut pushed = self.pushed.write().await;
            if pushed.get(room) == Some(&snapshot) {
                return false;
            }
            pushed.insert(room.to_string(), snapshot.clone());
        }
        self.broadcast_to_room(room, ServerMessage::RoomState { state: snapshot })
            .await;
        true
    }

    /// Rooms with at least one live subscriber. Channels nobody listens to
    /// anymore are dropped, along with what was last pushed to them.
    pub async fn watched_rooms(&self) -> Vec<RoomId> {
        let mut channels = self.channels.write().await;
        channels.retain(|_, tx| tx.receiver_count() > 0);
        self.pushed
            .write()
            .await
            .retain(|room, _| channels.contains_key(room));
        channels.keys().cloned().collect()
    }

    #[cfg(test)]
    pub(crate) async fn has_pushed(&self, room: &str) -> bool {
        self.pushed.read().await.contains_key(room)
    }

    /// Take the next question from the room's own deck
    pub async fn draw_question(&self, room: &str) -> QuestionRecord {
        let mut decks = self.decks.write().await;
        decks
            .entry(room.to_string())
            .or_insert_with(|| (*self.question_bank).clone())
            .draw(&mut rand::rng())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::FALLBACK_QUESTION;

    #[tokio::test]
    async fn test_rooms_have_separate_decks() {
        let state = AppState::new().with_question_bank(QuestionBank::new(vec![
            QuestionRecord::open("only question"),
        ]));

        assert_eq!(state.draw_question("r1").await.question, "only question");
        assert_eq!(state.draw_question("r1").await.question, FALLBACK_QUESTION);
        assert_eq!(state.draw_question("r2").await.question, "only question");
    }

    #[tokio::test]
    async fn test_watched_rooms_drops_idle_channels() {
        let state = AppState::new();
        let rx = state.subscribe("busy").await;
        drop(state.subscribe("idle").await);

        assert_eq!(state.watched_rooms().await, vec!["busy".to_string()]);
        drop(rx);
        assert!(state.watched_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let state = AppState::new();
        let mut rx = state.subscribe("r1").await;

        state.broadcast_to_room("r1", ServerMessage::RoomCleared).await;
        state.broadcast_to_room("r2", ServerMessage::RoomCleared).await;

        assert_eq!(rx.recv().await.unwrap(), ServerMessage::RoomCleared);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GameError::from(HerdError::InsufficientAnswers(1)).code(),
            "INSUFFICIENT_ANSWERS"
        );
        assert_eq!(
            GameError::from(StoreError::InvalidKey("x".to_string())).code(),
            "INVALID_KEY"
        );
        assert_eq!(
            GameError::InvalidTransition {
                from: RoomPhase::RevealedResult,
                to: RoomPhase::RevealedResult
            }
            .code(),
            "INVALID_TRANSITION"
        );
    }

    #[tokio::test]
    async fn test_same_snapshot_pushed_once() {
        let state = AppState::new();
        let mut rx = state.subscribe("r1").await;

        state.broadcast_room_state("r1").await;
        state.broadcast_room_state("r1").await;

        assert!(matches!(rx.recv().await.unwrap(), ServerMessage::RoomState { .. }));
        assert!(rx.try_recv().is_err());
    }
}
