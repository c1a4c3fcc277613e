use serde::{Deserialize, Serialize};

use crate::common::types::UserId;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VoteConfig {
    /// Channels with at most this many members skip without a vote.
    #[serde(default = "default_immediate_skip_max_participants")]
    pub immediate_skip_max_participants: usize,
    /// Role name (case-insensitive) that grants discretionary authority.
    #[serde(default = "default_elevated_role")]
    pub elevated_role: String,
    /// Users that always hold discretionary authority.
    #[serde(default)]
    pub privileged_users: Vec<UserId>,
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            immediate_skip_max_participants: default_immediate_skip_max_participants(),
            elevated_role: default_elevated_role(),
            privileged_users: Vec::new(),
        }
    }
}

fn default_immediate_skip_max_participants() -> usize {
    3
}

fn default_elevated_role() -> String {
    "dj".to_string()
}
