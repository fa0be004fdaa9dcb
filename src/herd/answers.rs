use crate::store::keyed_entries;
use crate::types::PlayerId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single player's answer for the current round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub player: PlayerId,
    pub text: String,
}

/// The answers of one round in submission order, at most one per player.
///
/// Order matters: grouping is greedy and the first answer of a group becomes
/// its representative. On the wire this is a JSON object keyed by player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: Vec<Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer. Resubmitting overwrites in place and keeps the
    /// player's original position.
    pub fn insert(&mut self, player: impl Into<PlayerId>, text: impl Into<String>) {
        let player = player.into();
        let text = text.into();
        match self.entries.iter_mut().find(|a| a.player == player) {
            Some(existing) => existing.text = text,
            None => self.entries.push(Answer { player, text }),
        }
    }

    pub fn get(&self, player: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|a| a.player == player)
            .map(|a| a.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Answer> {
        self.entries.iter()
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerId> {
        self.entries.iter().map(|a| &a.player)
    }
}

impl<P, T> FromIterator<(P, T)> for AnswerSheet
where
    P: Into<PlayerId>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut sheet = AnswerSheet::new();
        for (player, text) in iter {
            sheet.insert(player, text);
        }
        sheet
    }
}

impl Serialize for AnswerSheet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for answer in &self.entries {
            map.serialize_entry(&answer.player, &answer.text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnswerSheet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(keyed_entries::<D, String>(deserializer)?.into_iter().collect())
    }
}
