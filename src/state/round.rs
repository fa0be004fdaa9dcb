use super::{AppState, GameError};
use crate::herd::clean_answer;
use crate::store::{get_as, set_as, validate_key, RoomPaths};
use crate::types::*;

/// Check if a phase transition is valid
pub fn is_valid_transition(from: RoomPhase, to: RoomPhase) -> bool {
    use RoomPhase::*;
    matches!(
        (from, to),
        (AwaitingQuestion, CollectingAnswers)
            | (CollectingAnswers, CollectingAnswers)
            | (CollectingAnswers, RevealedResult)
            | (RevealedResult, AwaitingQuestion)
            | (Cleared, CollectingAnswers)
            | (Cleared, AwaitingQuestion)
            | (_, Cleared)
    )
}

/// Phases reachable from `from`
pub fn valid_transitions(from: RoomPhase) -> Vec<RoomPhase> {
    use RoomPhase::*;
    [AwaitingQuestion, CollectingAnswers, RevealedResult, Cleared]
        .into_iter()
        .filter(|to| is_valid_transition(from, *to))
        .collect()
}

/// Match `text` against a fixed set of choices, ignoring case and punctuation
fn canonicalize(text: &str, choices: &[String]) -> Option<String> {
    let cleaned = clean_answer(text);
    choices
        .iter()
        .find(|choice| clean_answer(choice) == cleaned)
        .cloned()
}

impl AppState {
    /// Current phase of a room.
    ///
    /// Rooms written without a phase key are inferred from what is stored.
    pub async fn phase(&self, paths: &RoomPaths) -> Result<RoomPhase, GameError> {
        if let Some(phase) = get_as::<RoomPhase>(self.store.as_ref(), &paths.phase()).await? {
            return Ok(phase);
        }
        if self.store.get(&paths.herd_result()).await?.is_some() {
            Ok(RoomPhase::RevealedResult)
        } else if self.store.get(&paths.question()).await?.is_some() {
            Ok(RoomPhase::CollectingAnswers)
        } else {
            Ok(RoomPhase::AwaitingQuestion)
        }
    }

    pub(super) async fn set_phase(&self, paths: &RoomPaths, phase: RoomPhase) -> Result<(), GameError> {
        set_as(self.store.as_ref(), &paths.phase(), &phase).await?;
        Ok(())
    }

    /// The question currently stored for a room
    pub async fn current_question(&self, paths: &RoomPaths) -> Result<Option<Question>, GameError> {
        Ok(self
            .store
            .get(&paths.question())
            .await?
            .map(Question::from_stored))
    }

    /// Publish a question and open a new round.
    ///
    /// Without a question the next one is drawn from the room's deck. Prior
    /// answers and herd result are removed; scores and roster stay.
    pub async fn publish_question(
        &self,
        room: &str,
        question: Option<Question>,
    ) -> Result<(RoundInfo, Question), GameError> {
        let paths = self.paths(room)?;
        let phase = self.phase(&paths).await?;
        // A revealed round is closed before the next question opens
        let from = match phase {
            RoomPhase::RevealedResult => RoomPhase::AwaitingQuestion,
            other => other,
        };
        if !is_valid_transition(from, RoomPhase::CollectingAnswers) {
            return Err(GameError::InvalidTransition {
                from: phase,
                to: RoomPhase::CollectingAnswers,
            });
        }

        let question = match question {
            Some(question) => question,
            None => self.draw_question(paths.room()).await.into(),
        };
        let round = RoundInfo::new();

        self.store.delete(&paths.answers()).await?;
        self.store.delete(&paths.herd_result()).await?;
        set_as(self.store.as_ref(), &paths.question(), &question).await?;
        set_as(self.store.as_ref(), &paths.round(), &round).await?;
        self.set_phase(&paths, RoomPhase::CollectingAnswers).await?;

        tracing::info!(
            "Room {} round {}: published question '{}'",
            paths.room(),
            round.id,
            question.text()
        );
        Ok((round, question))
    }

    /// Store a player's answer for the current round, overwriting any earlier
    /// one. Returns the text as stored.
    pub async fn submit_answer(
        &self,
        room: &str,
        player: &str,
        text: &str,
    ) -> Result<String, GameError> {
        let paths = self.paths(room)?;
        let player = validate_key(player)?;
        let phase = self.phase(&paths).await?;
        if phase != RoomPhase::CollectingAnswers {
            return Err(GameError::AnswersClosed(phase));
        }

        let text = text.trim();
        let stored = match self.current_question(&paths).await? {
            Some(question) => {
                let roster = self.load_roster(&paths).await?;
                let mode = question.answer_mode(&roster);
                canonicalize(text, mode.choices()).unwrap_or_else(|| text.to_string())
            }
            None => text.to_string(),
        };

        set_as(self.store.as_ref(), &paths.answer(&player), &stored).await?;
        set_as(self.store.as_ref(), &paths.player(&player), &true).await?;

        tracing::info!("Room {}: {} submitted an answer", paths.room(), player);
        Ok(stored)
    }

    /// Remove the round's question, answers and result. Scores and roster stay.
    pub async fn clear_room(&self, room: &str) -> Result<(), GameError> {
        let paths = self.paths(room)?;

        self.store.delete(&paths.question()).await?;
        self.store.delete(&paths.answers()).await?;
        self.store.delete(&paths.herd_result()).await?;
        self.store.delete(&paths.round()).await?;
        self.set_phase(&paths, RoomPhase::Cleared).await?;

        tracing::info!("Room {} cleared", paths.room());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::herd::AnswerSheet;
    use serde_json::json;

    #[test]
    fn test_valid_transitions() {
        use RoomPhase::*;
        assert!(is_valid_transition(AwaitingQuestion, CollectingAnswers));
        assert!(is_valid_transition(CollectingAnswers, RevealedResult));
        assert!(is_valid_transition(RevealedResult, AwaitingQuestion));
        assert!(is_valid_transition(RevealedResult, Cleared));
        assert!(is_valid_transition(Cleared, CollectingAnswers));

        assert!(!is_valid_transition(AwaitingQuestion, RevealedResult));
        assert!(!is_valid_transition(RevealedResult, RevealedResult));
        assert!(!is_valid_transition(RevealedResult, CollectingAnswers));

        assert_eq!(valid_transitions(RevealedResult), vec![AwaitingQuestion, Cleared]);
    }

    #[tokio::test]
    async fn test_phase_inferred_without_phase_key() {
        let state = AppState::new();
        let paths = state.paths("legacy").unwrap();
        assert_eq!(state.phase(&paths).await.unwrap(), RoomPhase::AwaitingQuestion);

        state.store.set(&paths.question(), json!("Name a fruit")).await.unwrap();
        assert_eq!(state.phase(&paths).await.unwrap(), RoomPhase::CollectingAnswers);

        state
            .store
            .set(&paths.herd_result(), json!({"herd_answer": null}))
            .await
            .unwrap();
        assert_eq!(state.phase(&paths).await.unwrap(), RoomPhase::RevealedResult);
    }

    #[tokio::test]
    async fn test_publish_clears_answers_but_keeps_scores() {
        let state = AppState::new();
        let paths = state.paths("r1").unwrap();
        state.store.set(&paths.answer("alice"), json!("old")).await.unwrap();
        state.store.set(&paths.score("alice"), json!(3)).await.unwrap();
        state.store.set(&paths.player("alice"), json!(true)).await.unwrap();

        let (round, question) = state
            .publish_question("r1", Some(Question::Text("Name a fruit".into())))
            .await
            .unwrap();

        assert_eq!(question.text(), "Name a fruit");
        assert_eq!(round.id.len(), 26);
        assert!(state.store.get(&paths.answers()).await.unwrap().is_none());
        assert_eq!(state.store.get(&paths.score("alice")).await.unwrap(), Some(json!(3)));
        assert_eq!(state.store.get(&paths.player("alice")).await.unwrap(), Some(json!(true)));
        assert_eq!(
            state.phase(&paths).await.unwrap(),
            RoomPhase::CollectingAnswers
        );
    }

    #[tokio::test]
    async fn test_publish_draws_from_deck() {
        let state = AppState::new();
        let (_, question) = state.publish_question("r1", None).await.unwrap();
        assert_eq!(question.text(), crate::questions::FALLBACK_QUESTION);
    }

    #[tokio::test]
    async fn test_submit_overwrites_and_trims() {
        let state = AppState::new();
        state
            .publish_question("r1", Some(Question::Text("Name a fruit".into())))
            .await
            .unwrap();

        state.submit_answer("r1", "alice", " apple ").await.unwrap();
        state.submit_answer("r1", "bob", "pear").await.unwrap();
        state.submit_answer("r1", "alice", "banana").await.unwrap();

        let paths = state.paths("r1").unwrap();
        let answers: AnswerSheet = get_as(state.store.as_ref(), &paths.answers())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(answers.len(), 2);
        assert_eq!(answers.get("alice"), Some("banana"));
        assert_eq!(answers.players().next().map(String::as_str), Some("alice"));
    }

    #[tokio::test]
    async fn test_submit_rejected_outside_collecting() {
        let state = AppState::new();
        let err = state.submit_answer("r1", "alice", "apple").await.unwrap_err();
        assert!(matches!(err, GameError::AnswersClosed(RoomPhase::AwaitingQuestion)));

        let err = state.submit_answer("r1", "a.b", "apple").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_KEY");
    }

    #[tokio::test]
    async fn test_choice_answers_are_canonicalised() {
        let state = AppState::new();
        let question = QuestionRecord::multiple_choice(
            "Cats or dogs?",
            vec!["Cats".to_string(), "Dogs".to_string()],
        );
        state.publish_question("r1", Some(question.into())).await.unwrap();

        assert_eq!(state.submit_answer("r1", "alice", "dogs!").await.unwrap(), "Dogs");
        assert_eq!(state.submit_answer("r1", "bob", "hamsters").await.unwrap(), "hamsters");
    }

    #[tokio::test]
    async fn test_pick_answers_match_roster() {
        let state = AppState::new();
        state
            .publish_question("r1", Some(Question::Text("warmup".into())))
            .await
            .unwrap();
        state.submit_answer("r1", "Alice", "x").await.unwrap();
        state.submit_answer("r1", "Bob", "y").await.unwrap();

        state
            .publish_question("r1", Some(QuestionRecord::pick("Who snores?").into()))
            .await
            .unwrap();
        assert_eq!(state.submit_answer("r1", "Alice", "bob").await.unwrap(), "Bob");
    }

    #[tokio::test]
    async fn test_clear_keeps_scores_and_roster() {
        let state = AppState::new();
        let paths = state.paths("r1").unwrap();
        state
            .publish_question("r1", Some(Question::Text("Name a fruit".into())))
            .await
            .unwrap();
        state.submit_answer("r1", "alice", "apple").await.unwrap();
        state.store.set(&paths.score("alice"), json!(2)).await.unwrap();

        state.clear_room("r1").await.unwrap();

        assert_eq!(state.phase(&paths).await.unwrap(), RoomPhase::Cleared);
        assert!(state.store.get(&paths.question()).await.unwrap().is_none());
        assert!(state.store.get(&paths.answers()).await.unwrap().is_none());
        assert_eq!(state.store.get(&paths.score("alice")).await.unwrap(), Some(json!(2)));
        assert_eq!(state.store.get(&paths.player("alice")).await.unwrap(), Some(json!(true)));
    }
}
