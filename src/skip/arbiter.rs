use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    common::errors::PlayerError,
    configs::VoteConfig,
    protocol::{Reporter, VotePhase},
    server::Session,
    skip::{
        authority::{Listener, has_track_authority},
        vote::{Ballot, Vote},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Stopped without a vote.
    Skipped,
    VoteStarted { tally: usize, quorum: usize },
    VoteAdded { tally: usize, quorum: usize },
    /// Repeat request from someone already counted; nothing changed.
    AlreadyVoted { tally: usize, quorum: usize },
    /// The vote reached quorum and the track was stopped.
    VotePassed { tally: usize, quorum: usize },
}

/// Decides between an immediate skip and a quorum vote.
pub struct SkipArbiter {
    config: VoteConfig,
    reporter: Arc<dyn Reporter>,
}

impl SkipArbiter {
    pub fn new(config: VoteConfig, reporter: Arc<dyn Reporter>) -> Self {
        Self { config, reporter }
    }

    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    /// Handle a skip request from `listener` against the session's current
    /// track. Runs entirely under the session lock.
    pub async fn request_skip(
        &self,
        session: &Session,
        listener: &Listener,
    ) -> Result<SkipOutcome, PlayerError> {
        let guild_id = session.guild_id();
        let ctx = session.lock().await;
        let track = ctx.current().cloned().ok_or(PlayerError::NothingPlaying)?;

        let participants = session.sink().participant_count();
        if participants <= self.config.immediate_skip_max_participants
            || has_track_authority(listener, &track, &self.config)
        {
            session.sink().stop().await?;
            track.clear_vote();
            info!(
                "[{}] {} skipped '{}'",
                guild_id,
                listener.name,
                track.title()
            );
            self.reporter.report_skip_immediate(guild_id, &track).await;
            return Ok(SkipOutcome::Skipped);
        }

        let quorum = participants / 2;
        let ballot = track.with_vote(|slot| Vote::cast(slot, listener.id, quorum));
        debug!(
            "[{}] skip ballot from {} on '{}': {:?}",
            guild_id,
            listener.id,
            track.title(),
            ballot
        );

        let outcome = match ballot {
            Ballot::Started { tally, quorum } => {
                self.reporter
                    .report_vote_state(guild_id, &track, tally, quorum, VotePhase::Started)
                    .await;
                SkipOutcome::VoteStarted { tally, quorum }
            }
            Ballot::Added { tally, quorum } => {
                self.reporter
                    .report_vote_state(guild_id, &track, tally, quorum, VotePhase::Added)
                    .await;
                SkipOutcome::VoteAdded { tally, quorum }
            }
            Ballot::AlreadyVoted { tally, quorum } => {
                self.reporter
                    .report_vote_state(guild_id, &track, tally, quorum, VotePhase::AlreadyVoted)
                    .await;
                SkipOutcome::AlreadyVoted { tally, quorum }
            }
            Ballot::Passed { tally, quorum } => {
                session.sink().stop().await?;
                self.reporter
                    .report_vote_state(guild_id, &track, tally, quorum, VotePhase::Passed)
                    .await;
                track.clear_vote();
                info!(
                    "[{}] skip vote passed on '{}' ({}/{})",
                    guild_id,
                    track.title(),
                    tally,
                    quorum
                );
                SkipOutcome::VotePassed { tally, quorum }
            }
        };

        drop(ctx);
        Ok(outcome)
    }
}
