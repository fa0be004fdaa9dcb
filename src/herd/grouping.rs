use super::answers::AnswerSheet;
use super::similarity::similarity;
use crate::types::PlayerId;
use serde::{Deserialize, Serialize};

/// Players whose answers were judged alike, labelled by the first answer seen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerGroup {
    pub representative: String,
    pub players: Vec<PlayerId>,
}

impl AnswerGroup {
    pub fn size(&self) -> usize {
        self.players.len()
    }
}

/// Greedy single-pass clustering of a round's answers.
///
/// Answers are visited in sheet order. Each joins the first existing group
/// whose representative scores at least `threshold` against it, otherwise it
/// opens a new group keyed by its raw text. Similarity is not transitive, so
/// the result depends on submission order.
pub fn group_answers(answers: &AnswerSheet, threshold: f64) -> Vec<AnswerGroup> {
    let mut groups: Vec<AnswerGroup> = Vec::new();

    for answer in answers.iter() {
        let matched = groups
            .iter_mut()
            .find(|group| similarity(&answer.text, &group.representative) >= threshold);

        match matched {
            Some(group) => group.players.push(answer.player.clone()),
            None => groups.push(AnswerGroup {
                representative: answer.text.clone(),
                players: vec![answer.player.clone()],
            }),
        }
    }

    groups
}
