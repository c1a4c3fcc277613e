use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlayerConfig {
    /// How often the session driver checks the current track for overrun.
    #[serde(default = "default_stall_check_interval_ms")]
    pub stall_check_interval_ms: u64,
    /// Elapsed time past the track duration before it counts as stalled.
    #[serde(default = "default_stall_grace_ms")]
    pub stall_grace_ms: u64,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stall_check_interval_ms: default_stall_check_interval_ms(),
            stall_grace_ms: default_stall_grace_ms(),
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

fn default_stall_check_interval_ms() -> u64 {
    5000
}

fn default_stall_grace_ms() -> u64 {
    5000
}

fn default_snapshot_dir() -> String {
    "snapshots".to_string()
}
