pub mod context;
pub mod manager;
pub mod queue;
pub mod state;

pub use context::{Finish, NextTrack, PlayerContext};
pub use queue::Queue;
pub use state::*;
