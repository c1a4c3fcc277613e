use std::{path::PathBuf, sync::Arc};

use tracing::{info, warn};

use crate::{
    common::{
        errors::PlayerError,
        types::{AnyResult, ChannelId, GuildId},
    },
    configs::Config,
    player::{LoopFlags, LoopMode, PlayerContext, manager},
    populator::Populator,
    protocol::{
        Reporter,
        tracks::{Track, TrackRequest},
    },
    server::{
        Session, SessionRegistry,
        guards::{require_playing, require_same_channel, require_session},
        snapshot::{SessionSnapshot, write_snapshot},
        supervisor::TaskSupervisor,
    },
    skip::{Listener, SkipArbiter, SkipOutcome},
    sources::TrackResolver,
    voice::VoiceConnector,
};

/// Top-level application state.
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub supervisor: Arc<TaskSupervisor>,
    pub connector: Arc<dyn VoiceConnector>,
    pub populator: Populator,
    pub arbiter: SkipArbiter,
    pub reporter: Arc<dyn Reporter>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        connector: Arc<dyn VoiceConnector>,
        resolver: Arc<dyn TrackResolver>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        Self {
            populator: Populator::new(registry.clone(), resolver, reporter.clone()),
            arbiter: SkipArbiter::new(config.vote.clone(), reporter.clone()),
            registry,
            supervisor: Arc::new(TaskSupervisor::new()),
            connector,
            reporter,
            config,
        }
    }

    /// Return the guild's session, connecting a new one to `channel_id` if
    /// none exists.
    pub async fn join(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<Session>, PlayerError> {
        if let Some(existing) = self.registry.get(guild_id) {
            return Ok(existing);
        }

        let session = Arc::new(
            Session::connect(
                guild_id,
                channel_id,
                self.connector.as_ref(),
                PlayerContext::new(),
            )
            .await?,
        );

        if let Err(existing) = self.registry.insert_new(session.clone()) {
            // Lost a race with a concurrent join.
            session.close().await;
            return Ok(existing);
        }

        manager::spawn_driver(
            &session,
            &self.supervisor,
            self.registry.clone(),
            self.reporter.clone(),
            self.config.player.clone(),
        );
        info!("[{}] Player session created in channel {}", guild_id, channel_id);
        Ok(session)
    }

    pub async fn leave(&self, guild_id: GuildId) -> Result<(), PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        self.registry.remove_if_current(&session);
        session.close().await;
        Ok(())
    }

    /// Append `requests` to the guild's queue and start resolving them in
    /// the background. Returns the new tracks in queue order.
    pub async fn enqueue(
        &self,
        guild_id: GuildId,
        requests: Vec<TrackRequest>,
    ) -> Result<Vec<Arc<Track>>, PlayerError> {
        let batch: Vec<Arc<Track>> = requests
            .into_iter()
            .map(|request| Arc::new(Track::new(request)))
            .collect();

        // A forced reset may swap the session while we wait for its lock.
        loop {
            let session = require_session(&self.registry, guild_id)?;
            if session.enqueue(&batch).await {
                break;
            }
        }

        info!("[{}] Queued {} track(s)", guild_id, batch.len());
        self.populator
            .spawn(&self.supervisor, guild_id, batch.clone());
        Ok(batch)
    }

    pub async fn request_skip(
        &self,
        guild_id: GuildId,
        listener: &Listener,
    ) -> Result<SkipOutcome, PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        require_same_channel(&session, listener)?;
        require_playing(&session).await?;
        self.arbiter.request_skip(&session, listener).await
    }

    pub async fn force_reset(&self, guild_id: GuildId) -> Result<Arc<Session>, PlayerError> {
        manager::force_reset(self, guild_id).await
    }

    pub async fn set_loop(
        &self,
        guild_id: GuildId,
        mode: LoopMode,
        enabled: bool,
    ) -> Result<LoopFlags, PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        let mut ctx = session.lock().await;
        ctx.flags.set(mode, enabled);
        info!("[{}] {:?} looping {}", guild_id, mode, if enabled { "on" } else { "off" });
        Ok(ctx.flags)
    }

    /// Remove the queued (not yet playing) track at `index`.
    pub async fn remove(&self, guild_id: GuildId, index: usize) -> Result<Arc<Track>, PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        let mut ctx = session.lock().await;
        let len = ctx.queue.len();
        let removed = ctx
            .queue
            .remove(index)
            .ok_or(PlayerError::IndexOutOfRange { index, len })?;
        session.notify_queue_changed();
        Ok(removed)
    }

    pub async fn clear(&self, guild_id: GuildId) -> Result<usize, PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        let removed = session.lock().await.queue.clear();
        session.notify_queue_changed();
        Ok(removed)
    }

    pub async fn shuffle(&self, guild_id: GuildId) -> Result<(), PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        session.lock().await.queue.shuffle();
        session.notify_queue_changed();
        Ok(())
    }

    pub async fn snapshot(&self, guild_id: GuildId) -> Result<SessionSnapshot, PlayerError> {
        let session = require_session(&self.registry, guild_id)?;
        Ok(session.snapshot(self.registry.len()).await)
    }

    /// Write the guild's snapshot under the configured snapshot directory.
    pub async fn dump_snapshot(&self, guild_id: GuildId) -> AnyResult<PathBuf> {
        let snapshot = self.snapshot(guild_id).await?;
        write_snapshot(&self.config.player.snapshot_dir, &snapshot)
    }

    /// Cancel every background task, then disconnect every session.
    pub async fn shutdown(&self) {
        info!("Shutting down {} player session(s)", self.registry.len());
        self.supervisor.cancel_all();
        for session in self.registry.drain() {
            session.close().await;
        }
        self.supervisor.await_all().await;
        if self.supervisor.in_flight() > 0 {
            warn!("Tasks spawned during shutdown were left running");
        }
    }
}
