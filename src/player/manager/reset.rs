use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::monitor::spawn_driver;
use crate::{
    common::{errors::PlayerError, types::GuildId},
    player::PlayerContext,
    server::{AppState, Session, guards::require_session},
};

/// Tear down the voice connection of `guild_id` and rebuild the session
/// around its queue and loop flags.
///
/// The current track is dropped, not re-queued. The old registry entry
/// stays in place, locked, until the replacement is connected, so
/// populators keep resolving and enqueues wait for the new session.
///
/// A reset that loses the lock to another reset returns the session that
/// one installed. A leave that lands while reconnecting wins; the fresh
/// connection is closed and the guild stays empty.
pub async fn force_reset(state: &AppState, guild_id: GuildId) -> Result<Arc<Session>, PlayerError> {
    let old = require_session(&state.registry, guild_id)?;
    info!("[{}] Force-resetting player", guild_id);

    old.halt();
    let mut ctx = old.lock().await;
    if !state.registry.is_current(&old) {
        drop(ctx);
        debug!("[{}] Session already replaced; skipping reset", guild_id);
        return require_session(&state.registry, guild_id);
    }

    let context = std::mem::take(&mut *ctx);
    if let Some(current) = context.current() {
        info!("[{}] Dropping current track '{}'", guild_id, current.title());
    }
    old.sink().disconnect().await;

    let (queue, flags) = context.into_parts();
    let replacement = match Session::connect(
        guild_id,
        old.channel_id(),
        state.connector.as_ref(),
        PlayerContext::from_parts(queue, flags),
    )
    .await
    {
        Ok(session) => Arc::new(session),
        Err(e) => {
            error!("[{}] Reconnect after reset failed: {}", guild_id, e);
            state.registry.remove_if_current(&old);
            return Err(e.into());
        }
    };

    if !state.registry.replace_if_current(&old, replacement.clone()) {
        drop(ctx);
        warn!("[{}] Player left during reset; dropping new connection", guild_id);
        replacement.close().await;
        return Err(PlayerError::NoSession(guild_id));
    }
    drop(ctx);

    spawn_driver(
        &replacement,
        &state.supervisor,
        state.registry.clone(),
        state.reporter.clone(),
        state.config.player.clone(),
    );
    replacement.wake();

    Ok(replacement)
}
