use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    common::{
        errors::ResolutionFailureKind,
        types::{TrackId, UserId},
    },
    skip::Vote,
};

/// The listener who asked for a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub id: UserId,
    pub name: String,
}

/// A raw enqueue request as received from a command handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRequest {
    /// Source URL or search identifier handed to the resolver.
    pub url: String,
    /// Provisional title known before resolution (e.g. from a playlist listing).
    #[serde(default)]
    pub title: Option<String>,
    pub requester: Requester,
}

impl TrackRequest {
    pub fn new(url: impl Into<String>, requester: Requester) -> Self {
        Self {
            url: url.into(),
            title: None,
            requester,
        }
    }
}

/// Playable metadata filled in by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackMetadata {
    pub title: String,
    pub uploader: String,
    /// Length in milliseconds. `None` for live streams.
    pub duration_ms: Option<u64>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackStatus {
    Unresolved,
    Resolving,
    Ready,
    Failed,
}

impl TrackStatus {
    /// Ready or failed; no further resolution will happen.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Elapsed playback against the resolved duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub elapsed_ms: u64,
    pub duration_ms: u64,
}

impl Progress {
    /// Percentage played, capped at 100.
    pub fn percent(&self) -> u64 {
        if self.duration_ms == 0 {
            return 100;
        }
        (self.elapsed_ms * 100 / self.duration_ms).min(100)
    }

    /// Elapsed time ran past the duration, which only happens when the
    /// output sink stopped delivering the finished signal.
    pub fn is_overrun(&self) -> bool {
        self.elapsed_ms > self.duration_ms
    }

    pub fn overrun_ms(&self) -> u64 {
        self.elapsed_ms.saturating_sub(self.duration_ms)
    }
}

/// Serializable view of a track for events and snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: TrackId,
    pub url: String,
    pub title: String,
    pub uploader: Option<String>,
    pub duration_ms: Option<u64>,
    pub thumbnail: Option<String>,
    pub requester: Requester,
    pub status: TrackStatus,
}

#[derive(Debug, Default)]
struct TrackState {
    metadata: Option<TrackMetadata>,
    failure: Option<ResolutionFailureKind>,
    started_at: Option<Instant>,
    vote: Option<Vote>,
    stall_reported: bool,
}

/// One playable item.
///
/// Tracks are shared as `Arc<Track>` between the queue that orders them and
/// the populator task that resolves them, so resolution state lives behind
/// interior mutability. Status changes are published on a watch channel so a
/// session waiting on its queue head wakes as soon as the head settles.
#[derive(Debug)]
pub struct Track {
    id: TrackId,
    request: TrackRequest,
    status: watch::Sender<TrackStatus>,
    state: RwLock<TrackState>,
}

impl Track {
    pub fn new(request: TrackRequest) -> Self {
        let (status, _) = watch::channel(TrackStatus::Unresolved);
        Self {
            id: TrackId::generate(),
            request,
            status,
            state: RwLock::new(TrackState::default()),
        }
    }

    /// A fresh, ready copy for re-appending under true looping: same
    /// identifier and metadata, no playback state, no vote.
    pub fn replay_copy(&self) -> Self {
        let (status, _) = watch::channel(self.status());
        let metadata = self.state.read().metadata.clone();
        Self {
            id: self.id,
            request: self.request.clone(),
            status,
            state: RwLock::new(TrackState {
                metadata,
                ..TrackState::default()
            }),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn request(&self) -> &TrackRequest {
        &self.request
    }

    pub fn requester(&self) -> &Requester {
        &self.request.requester
    }

    pub fn url(&self) -> &str {
        &self.request.url
    }

    pub fn status(&self) -> TrackStatus {
        *self.status.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.status() == TrackStatus::Ready
    }

    /// Resolved title, falling back to the provisional title and then the URL.
    pub fn title(&self) -> String {
        if let Some(meta) = self.metadata() {
            return meta.title;
        }
        self.request
            .title
            .clone()
            .unwrap_or_else(|| self.request.url.clone())
    }

    /// Resolved metadata. `None` until the track is ready.
    pub fn metadata(&self) -> Option<TrackMetadata> {
        if !self.is_ready() {
            return None;
        }
        self.state.read().metadata.clone()
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.metadata().and_then(|m| m.duration_ms)
    }

    pub fn failure(&self) -> Option<ResolutionFailureKind> {
        self.state.read().failure
    }

    pub fn mark_resolving(&self) {
        self.status.send_replace(TrackStatus::Resolving);
    }

    pub fn mark_ready(&self, metadata: TrackMetadata) {
        {
            let mut state = self.state.write();
            state.metadata = Some(metadata);
            state.failure = None;
        }
        self.status.send_replace(TrackStatus::Ready);
    }

    pub fn mark_failed(&self, kind: ResolutionFailureKind) {
        self.state.write().failure = Some(kind);
        self.status.send_replace(TrackStatus::Failed);
    }

    /// Wait until the track is ready or failed.
    pub async fn settled(&self) -> TrackStatus {
        let mut rx = self.status.subscribe();
        match rx.wait_for(|status| status.is_settled()).await {
            Ok(status) => *status,
            Err(_) => self.status(),
        }
    }

    /// Set the elapsed-time origin. Called when the session starts playing it.
    pub fn mark_started(&self) {
        let mut state = self.state.write();
        state.started_at = Some(Instant::now());
        state.stall_reported = false;
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.state.read().started_at
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at().map(|at| at.elapsed())
    }

    /// `None` until the track is ready, playing and has a known duration.
    pub fn progress(&self) -> Option<Progress> {
        let duration_ms = self.duration_ms()?;
        let elapsed = self.elapsed()?;
        Some(Progress {
            elapsed_ms: elapsed.as_millis() as u64,
            duration_ms,
        })
    }

    /// Forget playback-derived state once the track stops being current.
    pub fn reset_playback(&self) {
        let mut state = self.state.write();
        state.started_at = None;
        state.vote = None;
        state.stall_reported = false;
    }

    /// Returns true only the first time it is called for the current play.
    pub fn take_stall_report(&self) -> bool {
        let mut state = self.state.write();
        !std::mem::replace(&mut state.stall_reported, true)
    }

    pub fn vote(&self) -> Option<Vote> {
        self.state.read().vote.clone()
    }

    pub fn clear_vote(&self) {
        self.state.write().vote = None;
    }

    /// Run `f` with exclusive access to the vote slot.
    pub fn with_vote<R>(&self, f: impl FnOnce(&mut Option<Vote>) -> R) -> R {
        f(&mut self.state.write().vote)
    }

    pub fn summary(&self) -> TrackSummary {
        let metadata = self.metadata();
        TrackSummary {
            id: self.id,
            url: self.request.url.clone(),
            title: self.title(),
            uploader: metadata.as_ref().map(|m| m.uploader.clone()),
            duration_ms: metadata.as_ref().and_then(|m| m.duration_ms),
            thumbnail: metadata.and_then(|m| m.thumbnail),
            requester: self.request.requester.clone(),
            status: self.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn request() -> TrackRequest {
        TrackRequest {
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            title: Some("never gonna".to_string()),
            requester: Requester {
                id: UserId(7),
                name: "rick".to_string(),
            },
        }
    }

    fn metadata() -> TrackMetadata {
        TrackMetadata {
            title: "Never Gonna Give You Up".to_string(),
            uploader: "Rick Astley".to_string(),
            duration_ms: Some(212_000),
            thumbnail: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg".to_string()),
        }
    }

    #[test]
    fn test_metadata_hidden_until_ready() {
        let track = Track::new(request());
        assert_eq!(track.status(), TrackStatus::Unresolved);
        assert_eq!(track.title(), "never gonna");
        assert!(track.duration_ms().is_none());

        track.mark_resolving();
        assert!(track.metadata().is_none());

        track.mark_ready(metadata());
        assert!(track.is_ready());
        assert_eq!(track.title(), "Never Gonna Give You Up");
        assert_eq!(track.duration_ms(), Some(212_000));
    }

    #[test]
    fn test_title_falls_back_to_url() {
        let mut req = request();
        req.title = None;
        let track = Track::new(req);
        assert_eq!(track.title(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_failed_track_records_kind() {
        let track = Track::new(request());
        track.mark_resolving();
        track.mark_failed(ResolutionFailureKind::Download);
        assert_eq!(track.status(), TrackStatus::Failed);
        assert_eq!(track.failure(), Some(ResolutionFailureKind::Download));
        assert!(track.metadata().is_none());
    }

    #[test]
    fn test_progress_requires_start_and_duration() {
        let track = Track::new(request());
        track.mark_ready(metadata());
        assert!(track.progress().is_none());

        track.mark_started();
        let progress = track.progress().expect("playing track has progress");
        assert_eq!(progress.duration_ms, 212_000);
        assert!(!progress.is_overrun());

        track.reset_playback();
        assert!(track.started_at().is_none());
    }

    #[test]
    fn test_progress_overrun() {
        let progress = Progress {
            elapsed_ms: 215_000,
            duration_ms: 212_000,
        };
        assert!(progress.is_overrun());
        assert_eq!(progress.overrun_ms(), 3_000);
        assert_eq!(progress.percent(), 100);

        let half = Progress {
            elapsed_ms: 106_000,
            duration_ms: 212_000,
        };
        assert_eq!(half.percent(), 50);
    }

    #[test]
    fn test_replay_copy_drops_playback_state() {
        let track = Track::new(request());
        track.mark_ready(metadata());
        track.mark_started();
        track.with_vote(|slot| *slot = Some(Vote::new(UserId(1), 3)));

        let copy = track.replay_copy();
        assert_eq!(copy.id(), track.id());
        assert!(copy.is_ready());
        assert_eq!(copy.metadata(), Some(metadata()));
        assert!(copy.started_at().is_none());
        assert!(copy.vote().is_none());
        assert!(track.vote().is_some());
    }

    #[test]
    fn test_stall_reported_once_per_play() {
        let track = Track::new(request());
        track.mark_started();
        assert!(track.take_stall_report());
        assert!(!track.take_stall_report());
        track.mark_started();
        assert!(track.take_stall_report());
    }

    #[tokio::test]
    async fn test_settled_wakes_on_ready() {
        let track = Arc::new(Track::new(request()));
        let waiter = {
            let track = track.clone();
            tokio::spawn(async move { track.settled().await })
        };

        tokio::task::yield_now().await;
        track.mark_resolving();
        track.mark_ready(metadata());

        let status = waiter.await.expect("waiter should not panic");
        assert_eq!(status, TrackStatus::Ready);
    }

    #[tokio::test]
    async fn test_settled_returns_immediately_when_failed() {
        let track = Track::new(request());
        track.mark_failed(ResolutionFailureKind::Extraction);
        assert_eq!(track.settled().await, TrackStatus::Failed);
    }
}
