use crate::herd::{AnswerSheet, HerdOutcome};
use crate::store::keyed_entries;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type RoundId = String;

/// Shown when a reveal ends without a herd
pub const NO_HERD_MESSAGE: &str = "Too many leaders, not enough sheep! 🐑";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomPhase {
    AwaitingQuestion,
    CollectingAnswers,
    RevealedResult,
    Cleared,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Player,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    /// Free text answer
    Open,
    /// Multiple choice from `options`
    Mc,
    /// Pick one of the players in the room
    Pick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionRecord {
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl QuestionRecord {
    pub fn open(question: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Open,
            question: question.into(),
            options: None,
        }
    }

    pub fn multiple_choice(question: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            kind: QuestionKind::Mc,
            question: question.into(),
            options: Some(options),
        }
    }

    pub fn pick(question: impl Into<String>) -> Self {
        Self {
            kind: QuestionKind::Pick,
            question: question.into(),
            options: None,
        }
    }
}

/// The current question of a room: either bare text or a typed record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Question {
    Text(String),
    Record(QuestionRecord),
}

impl Question {
    /// Read whatever is stored under a room's `question` key.
    ///
    /// Anything that is not a well-formed question degrades to bare text so
    /// the room can still be played with free-text answers.
    pub fn from_stored(value: Value) -> Self {
        match serde_json::from_value::<Question>(value.clone()) {
            Ok(question) => question,
            Err(_) => match value.get("question").and_then(Value::as_str) {
                Some(text) => Question::Text(text.to_string()),
                None => Question::Text(value.to_string()),
            },
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Question::Text(text) => text,
            Question::Record(record) => &record.question,
        }
    }

    /// How players answer this question. `roster` is only used for pick questions.
    pub fn answer_mode(&self, roster: &[PlayerId]) -> AnswerMode {
        match self {
            Question::Record(QuestionRecord {
                kind: QuestionKind::Mc,
                options: Some(options),
                ..
            }) if !options.is_empty() => AnswerMode::Choice {
                options: options.clone(),
            },
            Question::Record(QuestionRecord {
                kind: QuestionKind::Pick,
                ..
            }) => AnswerMode::PickPlayer {
                players: roster.to_vec(),
            },
            _ => AnswerMode::FreeText,
        }
    }
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        Question::Record(record)
    }
}

/// Input control a client should render for the current question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnswerMode {
    FreeText,
    Choice { options: Vec<String> },
    PickPlayer { players: Vec<PlayerId> },
}

impl AnswerMode {
    /// Fixed answers to choose from, if any
    pub fn choices(&self) -> &[String] {
        match self {
            AnswerMode::FreeText => &[],
            AnswerMode::Choice { options } => options,
            AnswerMode::PickPlayer { players } => players,
        }
    }
}

/// Per-player verdict in a herd result
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mark {
    #[serde(rename = "✅")]
    InHerd,
    #[serde(rename = "❌")]
    Stray,
}

/// Identifies the question currently being played
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundInfo {
    pub id: RoundId,
    pub published_at: String,
}

impl RoundInfo {
    pub fn new() -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            published_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Default for RoundInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// Stored outcome of the last reveal, shown to every client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HerdResult {
    pub herd_answer: Option<String>,
    #[serde(default)]
    pub herd_players: Vec<PlayerId>,
    #[serde(default)]
    pub answers: AnswerSheet,
    #[serde(default, deserialize_with = "player_marks")]
    pub scores: BTreeMap<PlayerId, Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_id: Option<RoundId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revealed_at: Option<String>,
}

fn player_marks<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<PlayerId, Mark>, D::Error> {
    Ok(keyed_entries::<D, Mark>(deserializer)?.into_iter().collect())
}

impl HerdResult {
    /// Build the record for an outcome. Ties and empty outcomes mark everyone ❌.
    pub fn from_outcome(answers: &AnswerSheet, outcome: &HerdOutcome) -> Self {
        let herd = outcome.herd();
        let scores = answers
            .players()
            .map(|player| {
                let mark = match herd {
                    Some(group) if group.players.contains(player) => Mark::InHerd,
                    _ => Mark::Stray,
                };
                (player.clone(), mark)
            })
            .collect();

        Self {
            herd_answer: herd.map(|g| g.representative.clone()),
            herd_players: herd.map(|g| g.players.clone()).unwrap_or_default(),
            answers: answers.clone(),
            scores,
            message: herd.is_none().then(|| NO_HERD_MESSAGE.to_string()),
            round_id: None,
            revealed_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn mark(&self, player: &str) -> Mark {
        self.scores.get(player).copied().unwrap_or(Mark::Stray)
    }
}
