use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    common::types::{AnyResult, ChannelId, GuildId},
    player::{LoopFlags, PlayerState},
    protocol::tracks::{Progress, TrackSummary},
};

/// Diagnostic dump of one session, written when a listener reports a stuck
/// player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub timestamp_ms: u64,
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub created_at_ms: u64,
    pub sink_active: bool,
    pub state: PlayerState,
    pub flags: LoopFlags,
    pub current: Option<CurrentTrackSnapshot>,
    pub queue: Vec<TrackSummary>,
    pub queue_duration_ms: u64,
    pub active_sessions: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentTrackSnapshot {
    pub track: TrackSummary,
    pub elapsed_ms: Option<u64>,
    pub progress: Option<Progress>,
}

/// Write `snapshot` as pretty JSON under `dir` and return the file path.
pub fn write_snapshot(dir: impl AsRef<Path>, snapshot: &SessionSnapshot) -> AnyResult<PathBuf> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let format = time::macros::format_description!("[year]-[month]-[day]_[hour][minute][second]");
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    let stamp = now.format(&format)?;

    let path = dir.join(format!(
        "player_snapshot_{}_{}.json",
        stamp, snapshot.guild_id
    ));
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&path, json)?;

    tracing::info!("[{}] Wrote player snapshot to {}", snapshot.guild_id, path.display());
    Ok(path)
}
