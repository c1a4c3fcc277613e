//! Background resolution of enqueued batches.

use std::sync::Arc;

use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::{
    common::types::GuildId,
    protocol::{Reporter, tracks::Track},
    server::{SessionRegistry, supervisor::TaskSupervisor},
    sources::TrackResolver,
};

/// How a batch run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub resolved: usize,
    pub failed: usize,
    /// The guild's session went away before the batch was done; the
    /// remaining tracks were left unresolved.
    pub halted: bool,
}

/// Resolves queued tracks in place, strictly in batch order.
#[derive(Clone)]
pub struct Populator {
    registry: Arc<SessionRegistry>,
    resolver: Arc<dyn TrackResolver>,
    reporter: Arc<dyn Reporter>,
}

impl Populator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        resolver: Arc<dyn TrackResolver>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            registry,
            resolver,
            reporter,
        }
    }

    /// Resolve every track of `batch` one at a time.
    ///
    /// The registry is consulted before each item, so a session torn down
    /// mid-batch stops the run without touching the rest. A resolver error
    /// marks that one track failed and the run moves on.
    pub async fn populate(&self, guild_id: GuildId, batch: Vec<Arc<Track>>) -> BatchReport {
        let mut report = BatchReport::default();
        let total = batch.len();

        for (index, track) in batch.into_iter().enumerate() {
            if !self.registry.contains(guild_id) {
                info!(
                    "[{}] Player gone; leaving {} of {} tracks unresolved",
                    guild_id,
                    total - index,
                    total
                );
                report.halted = true;
                break;
            }

            if track.status().is_settled() {
                continue;
            }

            track.mark_resolving();
            match self.resolver.resolve(track.request()).await {
                Ok(metadata) => {
                    debug!("[{}] Resolved '{}'", guild_id, metadata.title);
                    track.mark_ready(metadata);
                    report.resolved += 1;
                }
                Err(e) => {
                    warn!("[{}] Could not resolve {}: {}", guild_id, track.url(), e);
                    track.mark_failed(e.kind());
                    report.failed += 1;
                    self.reporter
                        .report_resolution_failure(guild_id, &track, e.kind())
                        .await;
                }
            }
        }

        report
    }

    /// Run [`populate`](Self::populate) as a supervised background task.
    pub fn spawn(
        &self,
        supervisor: &TaskSupervisor,
        guild_id: GuildId,
        batch: Vec<Arc<Track>>,
    ) -> AbortHandle {
        let populator = self.clone();
        supervisor.spawn(async move {
            let report = populator.populate(guild_id, batch).await;
            debug!("[{}] Batch finished: {:?}", guild_id, report);
        })
    }
}
