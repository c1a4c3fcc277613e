use async_trait::async_trait;

use crate::{
    common::errors::ResolveError,
    protocol::tracks::{TrackMetadata, TrackRequest},
};

/// Resolves raw requests into playable metadata.
///
/// Implementations talk to the remote extractor (yt-dlp, a Lavalink node,
/// ...). Any error returned is treated as recoverable for the batch.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, request: &TrackRequest) -> Result<TrackMetadata, ResolveError>;
}
