use std::sync::Arc;

use tokio::{
    sync::{Mutex, MutexGuard, Notify, futures::Notified},
    task::AbortHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    common::{
        errors::SinkError,
        types::{ChannelId, GuildId, now_ms},
    },
    player::{PlayerContext, PlayerState},
    protocol::tracks::Track,
    server::snapshot::{CurrentTrackSnapshot, SessionSnapshot},
    voice::{SinkEvent, SinkNotifier, VoiceConnector, VoiceSink},
};

/// Per-guild playback session: a connected voice sink plus the queue state
/// it plays from.
///
/// The sink is fixed for the session's lifetime; recovering a stalled sink
/// means building a replacement session (see `force_reset`). Everything
/// mutable sits behind one mutex so command handlers and the driver task
/// never interleave inside a transition.
pub struct Session {
    guild_id: GuildId,
    channel_id: ChannelId,
    created_at: u64,
    sink: Arc<dyn VoiceSink>,
    notifier: SinkNotifier,
    events: parking_lot::Mutex<Option<flume::Receiver<SinkEvent>>>,
    context: Mutex<PlayerContext>,
    queue_changed: Notify,
    cancel_token: CancellationToken,
    driver: parking_lot::Mutex<Option<AbortHandle>>,
}

impl Session {
    /// Connect a sink for `channel_id` and build a session around `context`.
    pub async fn connect(
        guild_id: GuildId,
        channel_id: ChannelId,
        connector: &dyn VoiceConnector,
        context: PlayerContext,
    ) -> Result<Self, SinkError> {
        let (tx, rx) = flume::unbounded();
        let notifier = SinkNotifier::new(tx);
        let sink = connector
            .connect(guild_id, channel_id, notifier.clone())
            .await?;

        Ok(Self {
            guild_id,
            channel_id,
            created_at: now_ms(),
            sink,
            notifier,
            events: parking_lot::Mutex::new(Some(rx)),
            context: Mutex::new(context),
            queue_changed: Notify::new(),
            cancel_token: CancellationToken::new(),
            driver: parking_lot::Mutex::new(None),
        })
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn sink(&self) -> &Arc<dyn VoiceSink> {
        &self.sink
    }

    pub async fn lock(&self) -> MutexGuard<'_, PlayerContext> {
        self.context.lock().await
    }

    pub fn is_closed(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub async fn closed(&self) {
        self.cancel_token.cancelled().await
    }

    /// Append `batch` to the queue, waking the driver if nothing is playing.
    ///
    /// Returns `false` without touching the queue once the session has been
    /// closed or replaced; the caller should look the guild up again.
    pub async fn enqueue(&self, batch: &[Arc<Track>]) -> bool {
        let mut ctx = self.lock().await;
        if self.is_closed() {
            return false;
        }
        ctx.queue.extend(batch.iter().cloned());
        if ctx.state() == PlayerState::Idle {
            self.notifier.wake();
        }
        true
    }

    pub fn wake(&self) {
        self.notifier.wake();
    }

    /// Tell a driver waiting on the queue head that the queue was edited.
    /// Nobody waiting means nothing is stored for later.
    pub fn notify_queue_changed(&self) {
        self.queue_changed.notify_waiters();
    }

    /// Completes on the next [`Session::notify_queue_changed`] issued after
    /// this call, even if it fires before the future is first polled.
    pub(crate) fn queue_changed(&self) -> Notified<'_> {
        self.queue_changed.notified()
    }

    pub(crate) fn take_events(&self) -> Option<flume::Receiver<SinkEvent>> {
        self.events.lock().take()
    }

    pub(crate) fn set_driver(&self, handle: AbortHandle) {
        if let Some(previous) = self.driver.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Stop the driver. The sink stays connected.
    pub fn halt(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }

    /// Stop the driver and disconnect the sink.
    pub async fn close(&self) {
        tracing::info!("[{}] Closing player session", self.guild_id);
        self.halt();
        self.sink.disconnect().await;
    }

    pub async fn snapshot(&self, active_sessions: usize) -> SessionSnapshot {
        let ctx = self.lock().await;
        let current = ctx.current().map(|track| CurrentTrackSnapshot {
            track: track.summary(),
            elapsed_ms: track.elapsed().map(|e| e.as_millis() as u64),
            progress: track.progress(),
        });

        SessionSnapshot {
            timestamp_ms: now_ms(),
            guild_id: self.guild_id,
            channel_id: self.channel_id,
            created_at_ms: self.created_at,
            sink_active: self.sink.is_active(),
            state: ctx.state(),
            flags: ctx.flags,
            current,
            queue: ctx.queue.summaries(),
            queue_duration_ms: ctx.queue.total_duration_ms(),
            active_sessions,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!("[{}] Dropping player session", self.guild_id);
        self.cancel_token.cancel();
        if let Some(handle) = self.driver.lock().take() {
            handle.abort();
        }
    }
}
