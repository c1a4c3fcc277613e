use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    player::{Finish, NextTrack, PlayerContext, PlayerState},
    protocol::{Reporter, tracks::Track},
    server::Session,
    voice::SinkEvent,
};

/// How an [`advance`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advanced {
    Done,
    /// The sink reported a disconnect while the head was resolving.
    SinkLost,
}

/// Move `session` to its next track.
///
/// With `finished` set, the loop rules are applied to the current track
/// first; otherwise this only starts playback when the session is idle.
/// A head that is still resolving is awaited without holding the session
/// lock, so commands keep working while the session sits in `Advancing`.
/// Editing the queue during that wait makes the head be looked at again.
/// Sink events keep being read meanwhile; only a disconnect matters there.
pub async fn advance(
    session: &Session,
    events: &flume::Receiver<SinkEvent>,
    reporter: &dyn Reporter,
    finished: bool,
) -> Advanced {
    let guild_id = session.guild_id();
    let mut ctx = session.lock().await;

    if finished {
        match ctx.finish_current() {
            Finish::Replay(track) => {
                debug!("[{}] Looping '{}'", guild_id, track.title());
                start(session, &mut ctx, reporter, track).await;
                return Advanced::Done;
            }
            Finish::Advance => {}
            Finish::Nothing if ctx.state() == PlayerState::Idle => {}
            Finish::Nothing => return Advanced::Done,
        }
    } else if ctx.state() != PlayerState::Idle {
        return Advanced::Done;
    }

    loop {
        match ctx.take_next() {
            NextTrack::Play(track) => {
                start(session, &mut ctx, reporter, track).await;
                return Advanced::Done;
            }
            NextTrack::Discarded(track) => {
                debug!(
                    "[{}] Dropping '{}' from the queue: resolution failed",
                    guild_id,
                    track.url()
                );
            }
            NextTrack::Pending(head) => {
                debug!(
                    "[{}] Waiting for '{}' to finish resolving",
                    guild_id,
                    head.title()
                );
                // Registered before the lock is released so an edit made
                // right after cannot be missed.
                let changed = session.queue_changed();
                drop(ctx);
                tokio::select! {
                    _ = head.settled() => {}
                    _ = changed => {}
                    _ = session.closed() => return Advanced::Done,
                    event = events.recv_async() => match event {
                        Ok(SinkEvent::Disconnected) | Err(_) => return Advanced::SinkLost,
                        Ok(other) => debug!("[{}] Ignoring {:?} while waiting", guild_id, other),
                    },
                }
                ctx = session.lock().await;
            }
            NextTrack::Empty => {
                debug!("[{}] Queue drained; player is idle", guild_id);
                return Advanced::Done;
            }
        }
    }
}

async fn start(
    session: &Session,
    ctx: &mut PlayerContext,
    reporter: &dyn Reporter,
    track: Arc<Track>,
) {
    let guild_id = session.guild_id();
    match session.sink().play(&track).await {
        Ok(()) => {
            info!("[{}] Playback starting: {}", guild_id, track.title());
            reporter.report_track_start(guild_id, &track).await;
        }
        Err(e) => {
            error!(
                "[{}] Failed to start '{}': {}",
                guild_id,
                track.title(),
                e
            );
            ctx.abandon_current();
        }
    }
}
