use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    common::{
        errors::SinkError,
        types::{ChannelId, GuildId},
    },
    protocol::tracks::Track,
};

/// Signals consumed by a session's driver task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// The current track finished or was stopped.
    Finished,
    /// The voice connection is gone for good.
    Disconnected,
    /// Sent by the session itself when work arrives while idle.
    Wake,
}

/// Handed to the sink at connect time; the sink reports playback
/// completion and disconnects through it.
#[derive(Debug, Clone)]
pub struct SinkNotifier {
    tx: flume::Sender<SinkEvent>,
}

impl SinkNotifier {
    pub fn new(tx: flume::Sender<SinkEvent>) -> Self {
        Self { tx }
    }

    pub fn finished(&self) {
        let _ = self.tx.send(SinkEvent::Finished);
    }

    pub fn disconnected(&self) {
        let _ = self.tx.send(SinkEvent::Disconnected);
    }

    pub(crate) fn wake(&self) {
        let _ = self.tx.send(SinkEvent::Wake);
    }
}

/// Establishes voice output connections.
#[async_trait]
pub trait VoiceConnector: Send + Sync {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        notifier: SinkNotifier,
    ) -> Result<Arc<dyn VoiceSink>, SinkError>;
}

/// A connected voice output. Decoding and transport live behind it.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    fn channel_id(&self) -> ChannelId;

    /// Members currently in the voice channel, including the bot.
    fn participant_count(&self) -> usize;

    /// Begin playing a ready track. Completion is reported through the
    /// notifier as [`SinkEvent::Finished`].
    async fn play(&self, track: &Track) -> Result<(), SinkError>;

    /// Stop the current track. A [`SinkEvent::Finished`] follows.
    async fn stop(&self) -> Result<(), SinkError>;

    fn is_active(&self) -> bool;

    async fn disconnect(&self);
}
