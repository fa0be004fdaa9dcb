//! Question bank loaded from JSON files
//!
//! Each room draws from its own copy of the bank so questions are not repeated
//! within a room until it runs dry.

use crate::types::QuestionRecord;
use rand::Rng;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const OPEN_ENDED_FILE: &str = "questions-open_ended.json";
pub const MULTIPLE_CHOICE_FILE: &str = "questions-multiple_choice.json";
pub const PICK_A_PLAYER_FILE: &str = "questions-pick_a_player.json";

/// Issued once a bank is exhausted
pub const FALLBACK_QUESTION: &str = "What's your favourite food?";

#[derive(Debug, thiserror::Error)]
pub enum QuestionBankError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct MultipleChoiceEntry {
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionBank {
    questions: Vec<QuestionRecord>,
}

impl QuestionBank {
    pub fn new(questions: Vec<QuestionRecord>) -> Self {
        Self { questions }
    }

    /// Load all three question files from `dir`.
    ///
    /// A file that is missing or unreadable is logged and skipped, so a bad
    /// file never prevents the game from starting.
    pub fn load_dir(dir: &Path) -> Self {
        let open = load_or_warn::<String>(&dir.join(OPEN_ENDED_FILE));
        let multiple_choice = load_or_warn::<MultipleChoiceEntry>(&dir.join(MULTIPLE_CHOICE_FILE));
        let pick = load_or_warn::<String>(&dir.join(PICK_A_PLAYER_FILE));

        let questions: Vec<QuestionRecord> = open
            .into_iter()
            .map(QuestionRecord::open)
            .chain(
                multiple_choice
                    .into_iter()
                    .map(|q| QuestionRecord::multiple_choice(q.question, q.options)),
            )
            .chain(pick.into_iter().map(QuestionRecord::pick))
            .collect();

        tracing::info!("Loaded {} questions from {}", questions.len(), dir.display());
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Take a random question out of the bank, or the fallback when empty
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> QuestionRecord {
        if self.questions.is_empty() {
            tracing::debug!("Question bank exhausted, using fallback question");
            return QuestionRecord::open(FALLBACK_QUESTION);
        }
        let index = rng.random_range(0..self.questions.len());
        self.questions.swap_remove(index)
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, QuestionBankError> {
    let contents = std::fs::read_to_string(path).map_err(|source| QuestionBankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| QuestionBankError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_or_warn<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    load_json(path).unwrap_or_else(|e| {
        tracing::warn!("Error loading question file: {}", e);
        Vec::new()
    })
}
