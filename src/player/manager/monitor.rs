use std::{sync::Arc, time::Duration};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::advance::{Advanced, advance};
use crate::{
    configs::PlayerConfig,
    protocol::Reporter,
    server::{Session, SessionRegistry, supervisor::TaskSupervisor},
    voice::SinkEvent,
};

pub struct DriverCtx {
    pub session: Arc<Session>,
    pub events: flume::Receiver<SinkEvent>,
    pub registry: Arc<SessionRegistry>,
    pub reporter: Arc<dyn Reporter>,
    pub config: PlayerConfig,
}

/// Start the driver task for `session` under `supervisor`.
pub fn spawn_driver(
    session: &Arc<Session>,
    supervisor: &TaskSupervisor,
    registry: Arc<SessionRegistry>,
    reporter: Arc<dyn Reporter>,
    config: PlayerConfig,
) {
    let Some(events) = session.take_events() else {
        warn!("[{}] Session driver already running", session.guild_id());
        return;
    };

    let handle = supervisor.spawn(drive(DriverCtx {
        session: session.clone(),
        events,
        registry,
        reporter,
        config,
    }));
    session.set_driver(handle);
}

/// Consume sink signals for one session until it closes or the sink
/// disconnects. Only this task advances the queue, so transitions are
/// applied one at a time in signal order.
pub async fn drive(ctx: DriverCtx) {
    let DriverCtx {
        session,
        events,
        registry,
        reporter,
        config,
    } = ctx;
    let guild_id = session.guild_id();

    let period = Duration::from_millis(config.stall_check_interval_ms.max(100));
    let mut stall_check = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    stall_check.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = session.closed() => break,
            event = events.recv_async() => {
                let outcome = match event {
                    Ok(SinkEvent::Finished) => {
                        advance(&session, &events, reporter.as_ref(), true).await
                    }
                    Ok(SinkEvent::Wake) => {
                        advance(&session, &events, reporter.as_ref(), false).await
                    }
                    Ok(SinkEvent::Disconnected) | Err(_) => Advanced::SinkLost,
                };
                if outcome == Advanced::SinkLost {
                    info!("[{}] Voice sink disconnected; tearing down player", guild_id);
                    registry.remove_if_current(&session);
                    session.halt();
                    break;
                }
            }
            _ = stall_check.tick() => {
                check_stall(&session, reporter.as_ref(), config.stall_grace_ms).await;
            }
        }
    }

    debug!("[{}] Session driver stopped", guild_id);
}

async fn check_stall(session: &Session, reporter: &dyn Reporter, grace_ms: u64) {
    let current = session.lock().await.current().cloned();
    let Some(track) = current else {
        return;
    };
    let Some(progress) = track.progress() else {
        return;
    };

    if progress.overrun_ms() > grace_ms && track.take_stall_report() {
        warn!(
            "[{}] '{}' is {} ms past its end; the player has stalled",
            session.guild_id(),
            track.title(),
            progress.overrun_ms()
        );
        reporter
            .report_stalled(session.guild_id(), &track, progress)
            .await;
    }
}
