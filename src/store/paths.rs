use super::{StoreError, StoreResult};

/// Characters a realtime-database key may not contain
const FORBIDDEN_KEY_CHARS: &[char] = &['/', '.', '#', '$', '[', ']'];

/// Default prefix under which all rooms live
pub const DEFAULT_ROOT: &str = "herd_rooms";

/// Check that a room or player identifier can be used as one path segment.
/// Returns the trimmed identifier.
pub fn validate_key(key: &str) -> StoreResult<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidKey("identifier cannot be empty".to_string()));
    }
    if let Some(c) = trimmed.chars().find(|c| FORBIDDEN_KEY_CHARS.contains(c) || c.is_control()) {
        return Err(StoreError::InvalidKey(format!(
            "'{}' contains forbidden character {:?}",
            trimmed, c
        )));
    }
    Ok(trimmed.to_string())
}

/// Key layout of one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPaths {
    room: String,
    base: String,
}

impl RoomPaths {
    pub fn new(root: &str, room: &str) -> StoreResult<Self> {
        let room = validate_key(room)?;
        Ok(Self {
            base: format!("{}/{}", root.trim_matches('/'), room),
            room,
        })
    }

    /// The validated room identifier
    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn question(&self) -> String {
        format!("{}/question", self.base)
    }

    pub fn round(&self) -> String {
        format!("{}/round", self.base)
    }

    pub fn phase(&self) -> String {
        format!("{}/phase", self.base)
    }

    pub fn answers(&self) -> String {
        format!("{}/answers", self.base)
    }

    pub fn answer(&self, player: &str) -> String {
        format!("{}/answers/{}", self.base, player)
    }

    pub fn players(&self) -> String {
        format!("{}/players", self.base)
    }

    pub fn player(&self, player: &str) -> String {
        format!("{}/players/{}", self.base, player)
    }

    pub fn scores(&self) -> String {
        format!("{}/scores", self.base)
    }

    pub fn score(&self, player: &str) -> String {
        format!("{}/scores/{}", self.base, player)
    }

    pub fn herd_result(&self) -> String {
        format!("{}/herd_result", self.base)
    }
}
