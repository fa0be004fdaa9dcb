use super::grouping::AnswerGroup;
use crate::store::keyed_entries;
use crate::types::PlayerId;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Rounds won per player. Entries only ever go up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreTable {
    scores: BTreeMap<PlayerId, u64>,
}

/// One row of the scoreboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub player: PlayerId,
    pub score: u64,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: &str) -> u64 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    /// Seed a player's score, e.g. when loading from the store
    pub fn insert(&mut self, player: impl Into<PlayerId>, score: u64) {
        self.scores.insert(player.into(), score);
    }

    /// Give every member of the herd one point. Returns the updated scores
    /// of the awarded players.
    pub fn award(&mut self, herd: &AnswerGroup) -> Vec<ScoreEntry> {
        herd.players
            .iter()
            .map(|player| {
                let score = self.scores.entry(player.clone()).or_insert(0);
                *score += 1;
                ScoreEntry {
                    player: player.clone(),
                    score: *score,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Highest score first, ties broken by player name
    pub fn leaderboard(&self) -> Vec<ScoreEntry> {
        let mut entries: Vec<ScoreEntry> = self
            .scores
            .iter()
            .map(|(player, score)| ScoreEntry {
                player: player.clone(),
                score: *score,
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.player.cmp(&b.player)));
        entries
    }
}

impl<P: Into<PlayerId>> FromIterator<(P, u64)> for ScoreTable {
    fn from_iter<I: IntoIterator<Item = (P, u64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(p, s)| (p.into(), s)).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for ScoreTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(keyed_entries::<D, u64>(deserializer)?.into_iter().collect())
    }
}
