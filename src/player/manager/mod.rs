pub mod advance;
pub mod monitor;
pub mod reset;

pub use advance::{Advanced, advance};
pub use monitor::{DriverCtx, drive, spawn_driver};
pub use reset::force_reset;
