use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::types::{ChannelId, GuildId};

/// Errors surfaced to command handlers.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no active player for guild {0}")]
    NoSession(GuildId),
    #[error("nothing is playing")]
    NothingPlaying,
    #[error("listener is not connected to a voice channel")]
    NotInVoice,
    #[error("listener must be in the player's voice channel ({expected})")]
    WrongChannel { expected: ChannelId },
    #[error("queue position {index} is out of range (queue holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("voice sink unavailable: {0}")]
    SinkUnavailable(#[from] SinkError),
}

/// Failures of the external voice output sink.
#[derive(Debug, Clone, Error)]
pub enum SinkError {
    #[error("failed to connect to channel {channel}: {reason}")]
    Connect { channel: ChannelId, reason: String },
    #[error("failed to start playback: {0}")]
    Playback(String),
    #[error("failed to stop playback: {0}")]
    Stop(String),
}

/// Recoverable failures of the external track resolver.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("extraction failed: {0}")]
    Extraction(String),
    #[error("download failed: {0}")]
    Download(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolutionFailureKind {
    Extraction,
    Download,
}

impl ResolveError {
    pub fn kind(&self) -> ResolutionFailureKind {
        match self {
            Self::Extraction(_) => ResolutionFailureKind::Extraction,
            Self::Download(_) => ResolutionFailureKind::Download,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_kind() {
        assert_eq!(
            ResolveError::Extraction("no formats".into()).kind(),
            ResolutionFailureKind::Extraction
        );
        assert_eq!(
            ResolveError::Download("http 403".into()).kind(),
            ResolutionFailureKind::Download
        );
    }

    #[test]
    fn test_sink_error_converts_into_player_error() {
        let err: PlayerError = SinkError::Stop("gone".into()).into();
        assert!(matches!(err, PlayerError::SinkUnavailable(SinkError::Stop(_))));
        assert_eq!(
            err.to_string(),
            "voice sink unavailable: failed to stop playback: gone"
        );
    }
}
