use super::{AppState, GameError};
use crate::herd::{AnswerSheet, ScoreEntry, ScoreTable};
use crate::store::{get_as, set_as, RoomPaths};
use crate::types::*;

impl AppState {
    /// Group the round's answers, award the herd and store the result.
    ///
    /// Only the awarded players' scores are written. The phase is closed
    /// before any score is touched, so a round is scored at most once even
    /// when a later write fails; revealing again is an invalid transition.
    pub async fn reveal(&self, room: &str) -> Result<HerdResult, GameError> {
        let paths = self.paths(room)?;
        let phase = self.phase(&paths).await?;
        if phase != RoomPhase::CollectingAnswers {
            return Err(GameError::InvalidTransition {
                from: phase,
                to: RoomPhase::RevealedResult,
            });
        }

        let answers: AnswerSheet = get_as(self.store.as_ref(), &paths.answers())
            .await?
            .unwrap_or_default();
        let prior = self.load_scores(&paths).await?;

        let evaluation = self.engine.evaluate(&answers, &prior)?;

        let round: Option<RoundInfo> = get_as(self.store.as_ref(), &paths.round()).await?;
        let mut result = HerdResult::from_outcome(&answers, &evaluation.outcome);
        result.round_id = round.map(|r| r.id);

        self.set_phase(&paths, RoomPhase::RevealedResult).await?;
        set_as(self.store.as_ref(), &paths.herd_result(), &result).await?;

        for entry in &evaluation.awarded {
            if let Err(e) = set_as(self.store.as_ref(), &paths.score(&entry.player), &entry.score).await {
                tracing::error!(
                    "Room {}: failed to award {} after reveal: {}",
                    paths.room(),
                    entry.player,
                    e
                );
                return Err(e.into());
            }
        }

        match &result.herd_answer {
            Some(answer) => tracing::info!(
                "Room {}: herd answer '{}' with {} players",
                paths.room(),
                answer,
                result.herd_players.len()
            ),
            None => tracing::info!(
                "Room {}: no herd among {} groups",
                paths.room(),
                evaluation.groups.len()
            ),
        }
        Ok(result)
    }

    pub(crate) async fn load_scores(&self, paths: &RoomPaths) -> Result<ScoreTable, GameError> {
        Ok(get_as(self.store.as_ref(), &paths.scores())
            .await?
            .unwrap_or_default())
    }

    /// Leaderboard of a room, highest score first
    pub async fn get_scores(&self, room: &str) -> Result<Vec<ScoreEntry>, GameError> {
        let paths = self.paths(room)?;
        Ok(self.load_scores(&paths).await?.leaderboard())
    }

    /// Result of the last reveal, if the current round has been revealed
    pub async fn get_herd_result(&self, room: &str) -> Result<Option<HerdResult>, GameError> {
        let paths = self.paths(room)?;
        Ok(get_as(self.store.as_ref(), &paths.herd_result()).await?)
    }
}
