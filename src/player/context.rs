use std::sync::Arc;

use crate::{
    player::{
        queue::Queue,
        state::{LoopFlags, PlayerState},
    },
    protocol::tracks::{Track, TrackStatus},
};

/// What happened to the track that just finished.
#[derive(Debug)]
pub enum Finish {
    /// Track looping: the same track is current again.
    Replay(Arc<Track>),
    /// The queue must be consulted for the next track.
    Advance,
    /// There was no current track.
    Nothing,
}

/// Outcome of looking at the queue head.
#[derive(Debug)]
pub enum NextTrack {
    /// Head was ready; it is now current.
    Play(Arc<Track>),
    /// Head is still resolving. It stays queued.
    Pending(Arc<Track>),
    /// Head failed to resolve and was dropped.
    Discarded(Arc<Track>),
    /// Nothing queued; the session is idle.
    Empty,
}

/// Mutable per-session playback state. Always accessed through the
/// session's mutex, so every method here runs atomically with respect to
/// skips, enqueues and driver transitions.
#[derive(Debug)]
pub struct PlayerContext {
    pub queue: Queue,
    pub flags: LoopFlags,
    current: Option<Arc<Track>>,
    state: PlayerState,
}

impl Default for PlayerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerContext {
    pub fn new() -> Self {
        Self::from_parts(Queue::new(), LoopFlags::default())
    }

    /// Context carried over from a previous session; nothing is current.
    pub fn from_parts(queue: Queue, flags: LoopFlags) -> Self {
        Self {
            queue,
            flags,
            current: None,
            state: PlayerState::Idle,
        }
    }

    /// Queue and flags, dropping the current track.
    pub fn into_parts(self) -> (Queue, LoopFlags) {
        if let Some(current) = &self.current {
            current.reset_playback();
        }
        (self.queue, self.flags)
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn current(&self) -> Option<&Arc<Track>> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayerState::Playing && self.current.is_some()
    }

    /// Apply the loop rules to the track that just finished: `true_looping`
    /// or else `queue_looping` decides what goes back on the tail, then
    /// `looping` decides whether the same track plays again.
    pub fn finish_current(&mut self) -> Finish {
        let Some(finished) = self.current.take() else {
            return Finish::Nothing;
        };
        finished.reset_playback();

        if self.flags.true_looping {
            self.queue.push_back(Arc::new(finished.replay_copy()));
        } else if self.flags.queue_looping {
            self.queue.push_back(finished.clone());
        }

        if self.flags.replays_current() {
            finished.mark_started();
            self.current = Some(finished.clone());
            self.state = PlayerState::Playing;
            return Finish::Replay(finished);
        }

        self.state = PlayerState::Advancing;
        Finish::Advance
    }

    /// Promote the queue head to current if it is ready.
    pub fn take_next(&mut self) -> NextTrack {
        let Some(head) = self.queue.front() else {
            self.state = PlayerState::Idle;
            return NextTrack::Empty;
        };

        match head.status() {
            TrackStatus::Ready => {
                let Some(track) = self.queue.pop_front() else {
                    self.state = PlayerState::Idle;
                    return NextTrack::Empty;
                };
                track.mark_started();
                self.current = Some(track.clone());
                self.state = PlayerState::Playing;
                NextTrack::Play(track)
            }
            TrackStatus::Failed => match self.queue.pop_front() {
                Some(track) => NextTrack::Discarded(track),
                None => NextTrack::Empty,
            },
            TrackStatus::Unresolved | TrackStatus::Resolving => {
                self.state = PlayerState::Advancing;
                NextTrack::Pending(head.clone())
            }
        }
    }

    /// Drop the current track without applying loop rules and go idle.
    pub fn abandon_current(&mut self) -> Option<Arc<Track>> {
        self.state = PlayerState::Idle;
        let track = self.current.take()?;
        track.reset_playback();
        Some(track)
    }
}
