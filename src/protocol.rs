use crate::herd::ScoreEntry;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    SubmitAnswer {
        text: String,
    },
    /// Ask for a fresh room snapshot
    RequestState,
    // Host-only messages
    /// Publish a question; without one the next question is drawn from the room's bank
    HostNewQuestion {
        #[serde(default)]
        question: Option<Question>,
    },
    HostReveal,
    HostClearRoom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        room: RoomId,
        player: PlayerId,
        /// Clients that cannot keep a socket open should poll at this interval
        poll_interval_ms: u64,
        state: RoomSnapshot,
    },
    RoomState {
        state: RoomSnapshot,
    },
    QuestionPublished {
        round: RoundInfo,
        question: Question,
        answer_mode: AnswerMode,
    },
    /// Sent to a player when their answer is stored
    AnswerAccepted {
        text: String,
    },
    HerdRevealed {
        result: HerdResult,
    },
    RoomCleared,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

/// Everything a client needs to render a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSnapshot {
    pub room: RoomId,
    pub phase: RoomPhase,
    pub valid_transitions: Vec<RoomPhase>,
    pub round: Option<RoundInfo>,
    pub question: Option<Question>,
    pub answer_mode: Option<AnswerMode>,
    /// Players who answered this round. Texts stay hidden until the reveal.
    pub submitted: Vec<PlayerId>,
    /// Everyone who ever answered in this room
    pub players: Vec<PlayerId>,
    pub leaderboard: Vec<ScoreEntry>,
    pub herd_result: Option<HerdResult>,
}
