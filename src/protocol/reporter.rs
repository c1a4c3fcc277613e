use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    common::{errors::ResolutionFailureKind, types::GuildId},
    protocol::{
        events::{PlayerEvent, VotePhase},
        tracks::{Progress, Track},
    },
};

/// Outbound seam to the presentation layer. The core reports state here;
/// formatting is the implementor's concern.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn report_vote_state(
        &self,
        guild_id: GuildId,
        track: &Track,
        tally: usize,
        quorum: usize,
        phase: VotePhase,
    );

    async fn report_skip_immediate(&self, guild_id: GuildId, track: &Track);

    async fn report_resolution_failure(
        &self,
        guild_id: GuildId,
        track: &Track,
        kind: ResolutionFailureKind,
    );

    async fn report_track_start(&self, _guild_id: GuildId, _track: &Track) {}

    async fn report_stalled(&self, _guild_id: GuildId, _track: &Track, _progress: Progress) {}
}

/// Forwards every report as a [`PlayerEvent`] over a channel.
pub struct ChannelReporter {
    sender: flume::Sender<PlayerEvent>,
}

impl ChannelReporter {
    pub fn new(sender: flume::Sender<PlayerEvent>) -> Self {
        Self { sender }
    }

    pub fn unbounded() -> (Self, flume::Receiver<PlayerEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self::new(tx), rx)
    }

    fn send(&self, event: PlayerEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Event receiver dropped; discarding player event");
        }
    }
}

#[async_trait]
impl Reporter for ChannelReporter {
    async fn report_vote_state(
        &self,
        guild_id: GuildId,
        track: &Track,
        tally: usize,
        quorum: usize,
        phase: VotePhase,
    ) {
        let (initiator, mut voters) = match track.vote() {
            Some(vote) => (vote.initiator(), vote.voters()),
            None => (track.requester().id, Vec::new()),
        };
        voters.sort();
        self.send(PlayerEvent::VoteState {
            guild_id,
            track: track.summary(),
            initiator,
            voters,
            tally,
            quorum,
            phase,
        });
    }

    async fn report_skip_immediate(&self, guild_id: GuildId, track: &Track) {
        self.send(PlayerEvent::SkipImmediate {
            guild_id,
            track: track.summary(),
        });
    }

    async fn report_resolution_failure(
        &self,
        guild_id: GuildId,
        track: &Track,
        kind: ResolutionFailureKind,
    ) {
        self.send(PlayerEvent::ResolutionFailure {
            guild_id,
            track: track.summary(),
            kind,
        });
    }

    async fn report_track_start(&self, guild_id: GuildId, track: &Track) {
        self.send(PlayerEvent::TrackStart {
            guild_id,
            track: track.summary(),
        });
    }

    async fn report_stalled(&self, guild_id: GuildId, track: &Track, progress: Progress) {
        self.send(PlayerEvent::TrackStalled {
            guild_id,
            track: track.summary(),
            elapsed_ms: progress.elapsed_ms,
            duration_ms: progress.duration_ms,
        });
    }
}

/// Writes reports to the log only. Useful when no chat surface is attached.
pub struct LogReporter;

#[async_trait]
impl Reporter for LogReporter {
    async fn report_vote_state(
        &self,
        guild_id: GuildId,
        track: &Track,
        tally: usize,
        quorum: usize,
        phase: VotePhase,
    ) {
        info!(
            "[{}] skip vote on '{}': {:?} ({}/{})",
            guild_id,
            track.title(),
            phase,
            tally,
            quorum
        );
    }

    async fn report_skip_immediate(&self, guild_id: GuildId, track: &Track) {
        info!("[{}] skipped '{}'", guild_id, track.title());
    }

    async fn report_resolution_failure(
        &self,
        guild_id: GuildId,
        track: &Track,
        kind: ResolutionFailureKind,
    ) {
        warn!(
            "[{}] could not resolve '{}': {:?}",
            guild_id,
            track.url(),
            kind
        );
    }

    async fn report_stalled(&self, guild_id: GuildId, track: &Track, progress: Progress) {
        warn!(
            "[{}] '{}' overran its duration by {} ms; the player has stalled",
            guild_id,
            track.title(),
            progress.overrun_ms()
        );
    }
}
