//! Checks command handlers run before touching a session.

use std::sync::Arc;

use crate::{
    common::{errors::PlayerError, types::GuildId},
    protocol::tracks::Track,
    server::{Session, SessionRegistry},
    skip::Listener,
};

pub fn require_session(
    registry: &SessionRegistry,
    guild_id: GuildId,
) -> Result<Arc<Session>, PlayerError> {
    registry
        .get(guild_id)
        .ok_or(PlayerError::NoSession(guild_id))
}

/// The listener must be connected to the session's voice channel.
pub fn require_same_channel(session: &Session, listener: &Listener) -> Result<(), PlayerError> {
    match listener.voice_channel {
        None => Err(PlayerError::NotInVoice),
        Some(channel) if channel != session.channel_id() => Err(PlayerError::WrongChannel {
            expected: session.channel_id(),
        }),
        Some(_) => Ok(()),
    }
}

/// The track currently playing, if any.
pub async fn require_playing(session: &Session) -> Result<Arc<Track>, PlayerError> {
    let ctx = session.lock().await;
    if !ctx.is_playing() {
        return Err(PlayerError::NothingPlaying);
    }
    ctx.current().cloned().ok_or(PlayerError::NothingPlaying)
}
