pub mod arbiter;
pub mod authority;
pub mod vote;

pub use arbiter::{SkipArbiter, SkipOutcome};
pub use authority::{Listener, Role, has_discretionary_authority, has_track_authority};
pub use vote::{Ballot, Vote};
