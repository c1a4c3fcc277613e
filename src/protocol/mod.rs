pub mod events;
pub mod reporter;
pub mod tracks;

pub use events::*;
pub use reporter::*;
pub use tracks::*;
