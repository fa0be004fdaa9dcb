use super::round::valid_transitions;
use super::{AppState, GameError};
use crate::protocol::RoomSnapshot;
use crate::store::{child_keys, get_as, RoomPaths};
use crate::types::*;

impl AppState {
    /// Everyone who has ever answered in the room
    pub(crate) async fn load_roster(&self, paths: &RoomPaths) -> Result<Vec<PlayerId>, GameError> {
        Ok(child_keys(self.store.get(&paths.players()).await?.as_ref()))
    }

    /// Load everything a client needs to render the room
    pub async fn snapshot(&self, room: &str) -> Result<RoomSnapshot, GameError> {
        let paths = self.paths(room)?;
        let phase = self.phase(&paths).await?;
        let players = self.load_roster(&paths).await?;
        let question = self.current_question(&paths).await?;
        let answer_mode = question.as_ref().map(|q| q.answer_mode(&players));

        Ok(RoomSnapshot {
            room: paths.room().to_string(),
            phase,
            valid_transitions: valid_transitions(phase),
            round: get_as(self.store.as_ref(), &paths.round()).await?,
            question,
            answer_mode,
            submitted: child_keys(self.store.get(&paths.answers()).await?.as_ref()),
            players,
            leaderboard: self.load_scores(&paths).await?.leaderboard(),
            herd_result: get_as(self.store.as_ref(), &paths.herd_result()).await?,
        })
    }
}
