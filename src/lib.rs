pub mod common;
pub mod configs;
pub mod player;
pub mod populator;
pub mod protocol;
pub mod server;
pub mod skip;
pub mod sources;
pub mod voice;

#[cfg(test)]
pub(crate) mod test_support;

pub use common::errors::{PlayerError, ResolveError, SinkError};
pub use server::{AppState, Session, SessionRegistry};
