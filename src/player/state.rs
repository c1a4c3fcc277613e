use serde::{Deserialize, Serialize};

/// Where a session is in its playback cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerState {
    /// Nothing current and nothing being waited on.
    Idle,
    /// A current track is set and the sink is playing it.
    Playing,
    /// The current track just finished; waiting for the queue head.
    Advancing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopMode {
    /// Replay the current track.
    Track,
    /// Append finished tracks to the tail.
    Queue,
    /// Append a fresh copy of every finished track. Takes precedence over
    /// `Queue`.
    All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopFlags {
    pub looping: bool,
    pub queue_looping: bool,
    pub true_looping: bool,
}

impl LoopFlags {
    pub fn set(&mut self, mode: LoopMode, enabled: bool) {
        match mode {
            LoopMode::Track => self.looping = enabled,
            LoopMode::Queue => self.queue_looping = enabled,
            LoopMode::All => self.true_looping = enabled,
        }
    }

    pub fn get(&self, mode: LoopMode) -> bool {
        match mode {
            LoopMode::Track => self.looping,
            LoopMode::Queue => self.queue_looping,
            LoopMode::All => self.true_looping,
        }
    }

    /// Whether a finished track is replayed in place.
    pub fn replays_current(&self) -> bool {
        self.looping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_modes() {
        let mut flags = LoopFlags::default();
        flags.set(LoopMode::Queue, true);
        assert!(flags.get(LoopMode::Queue));
        assert!(!flags.get(LoopMode::Track));
        flags.set(LoopMode::Queue, false);
        assert_eq!(flags, LoopFlags::default());
    }

    #[test]
    fn test_track_loop_survives_other_modes() {
        let mut flags = LoopFlags::default();
        flags.set(LoopMode::Track, true);
        assert!(flags.replays_current());

        flags.set(LoopMode::All, true);
        flags.set(LoopMode::Queue, true);
        assert!(flags.replays_current());
        flags.set(LoopMode::Track, false);
        assert!(!flags.replays_current());
    }
}
