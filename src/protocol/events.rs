use serde::Serialize;

use crate::{
    common::{
        errors::ResolutionFailureKind,
        types::{GuildId, UserId},
    },
    protocol::tracks::TrackSummary,
};

/// Where a skip vote stands after a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum VotePhase {
    Started,
    Added,
    AlreadyVoted,
    Passed,
}

/// Events emitted by a session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerEvent {
    #[serde(rename = "TrackStartEvent")]
    TrackStart {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: TrackSummary,
    },

    #[serde(rename = "VoteStateEvent")]
    VoteState {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: TrackSummary,
        initiator: UserId,
        voters: Vec<UserId>,
        tally: usize,
        quorum: usize,
        phase: VotePhase,
    },

    #[serde(rename = "SkipImmediateEvent")]
    SkipImmediate {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: TrackSummary,
    },

    #[serde(rename = "ResolutionFailureEvent")]
    ResolutionFailure {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: TrackSummary,
        kind: ResolutionFailureKind,
    },

    #[serde(rename = "TrackStalledEvent")]
    TrackStalled {
        #[serde(rename = "guildId")]
        guild_id: GuildId,
        track: TrackSummary,
        #[serde(rename = "elapsedMs")]
        elapsed_ms: u64,
        #[serde(rename = "durationMs")]
        duration_ms: u64,
    },
}

impl PlayerEvent {
    pub fn guild_id(&self) -> GuildId {
        match self {
            Self::TrackStart { guild_id, .. }
            | Self::VoteState { guild_id, .. }
            | Self::SkipImmediate { guild_id, .. }
            | Self::ResolutionFailure { guild_id, .. }
            | Self::TrackStalled { guild_id, .. } => *guild_id,
        }
    }
}
