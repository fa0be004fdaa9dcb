use crate::state::AppState;
use crate::types::RoomId;
use std::sync::Arc;

/// Spawn a background task that pushes room changes to connected clients.
///
/// Every poll interval each watched room is reloaded from the store. A
/// snapshot that differs from the last one pushed is broadcast, which picks up
/// writes made by other servers sharing the same store. Pushes made by the
/// room handlers count as pushed, so the watcher does not repeat them.
pub fn spawn_room_watcher(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;
            refresh_rooms(&state).await;
        }
    })
}

/// One watcher pass. Returns the rooms a new snapshot was pushed to.
pub async fn refresh_rooms(state: &AppState) -> Vec<RoomId> {
    let mut changed = Vec::new();
    for room in state.watched_rooms().await {
        let snapshot = match state.snapshot(&room).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Failed to refresh room {}: {}", room, e);
                continue;
            }
        };
        if state.push_snapshot(&room, snapshot).await {
            tracing::debug!("Room {} changed, pushed new state", room);
            changed.push(room);
        }
    }
    changed
}
