use crate::{
    common::types::{ChannelId, UserId},
    configs::VoteConfig,
    protocol::tracks::Track,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub manage_channels: bool,
    pub administrator: bool,
}

impl Role {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The member issuing a command, as seen by the chat platform adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listener {
    pub id: UserId,
    pub name: String,
    pub roles: Vec<Role>,
    /// Voice channel the listener is connected to, if any.
    pub voice_channel: Option<ChannelId>,
    /// Member count of that voice channel.
    pub channel_members: usize,
}

impl Listener {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roles: Vec::new(),
            voice_channel: None,
            channel_members: 0,
        }
    }

    pub fn in_channel(mut self, channel: ChannelId, members: usize) -> Self {
        self.voice_channel = Some(channel);
        self.channel_members = members;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }
}

/// Control over the player as a whole.
pub fn has_discretionary_authority(listener: &Listener, config: &VoteConfig) -> bool {
    if listener.voice_channel.is_some()
        && listener.channel_members <= config.immediate_skip_max_participants
    {
        return true;
    }

    let elevated = listener.roles.iter().any(|role| {
        role.name.eq_ignore_ascii_case(&config.elevated_role)
            || role.manage_channels
            || role.administrator
    });
    if elevated {
        return true;
    }

    config.privileged_users.contains(&listener.id)
}

/// Control over one specific track.
pub fn has_track_authority(listener: &Listener, track: &Track, config: &VoteConfig) -> bool {
    track.requester().id == listener.id || has_discretionary_authority(listener, config)
}
