//! Fakes for the voice and resolver seams, shared by the unit tests.

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    common::{
        errors::{ResolveError, SinkError},
        types::{ChannelId, GuildId, TrackId, UserId},
    },
    player::PlayerContext,
    protocol::tracks::{Requester, Track, TrackMetadata, TrackRequest},
    server::Session,
    sources::TrackResolver,
    voice::{SinkNotifier, VoiceConnector, VoiceSink},
};

pub fn requester(id: UserId) -> Requester {
    Requester {
        id,
        name: format!("user{}", id),
    }
}

pub fn request_track(url: &str, requester_id: UserId) -> Arc<Track> {
    Arc::new(Track::new(TrackRequest::new(url, requester(requester_id))))
}

pub fn metadata(title: &str) -> TrackMetadata {
    TrackMetadata {
        title: title.to_string(),
        uploader: "uploader".to_string(),
        duration_ms: Some(180_000),
        thumbnail: None,
    }
}

pub fn ready_track(title: &str, requester_id: UserId) -> Arc<Track> {
    let track = request_track(&format!("https://example.com/{title}"), requester_id);
    track.mark_ready(metadata(title));
    track
}

/// Poll `check` until it holds, panicking after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not reached in time"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub struct MockSink {
    channel_id: ChannelId,
    notifier: SinkNotifier,
    participants: AtomicUsize,
    played: Mutex<Vec<(TrackId, String)>>,
    stops: AtomicUsize,
    fail_play: AtomicBool,
    fail_stop: AtomicBool,
    disconnected: AtomicBool,
}

impl MockSink {
    pub fn new(channel_id: ChannelId, notifier: SinkNotifier) -> Self {
        Self {
            channel_id,
            notifier,
            participants: AtomicUsize::new(2),
            played: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            fail_play: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
        }
    }

    pub fn set_participants(&self, count: usize) {
        self.participants.store(count, Ordering::SeqCst);
    }

    pub fn fail_play(&self, fail: bool) {
        self.fail_play.store(fail, Ordering::SeqCst);
    }

    pub fn fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn played_ids(&self) -> Vec<TrackId> {
        self.played.lock().iter().map(|(id, _)| *id).collect()
    }

    pub fn played_titles(&self) -> Vec<String> {
        self.played.lock().iter().map(|(_, t)| t.clone()).collect()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// Simulate the end of the current track.
    pub fn finish(&self) {
        self.notifier.finished();
    }

    /// Simulate the voice connection dropping.
    pub fn drop_connection(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
        self.notifier.disconnected();
    }
}

#[async_trait]
impl VoiceSink for MockSink {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn participant_count(&self) -> usize {
        self.participants.load(Ordering::SeqCst)
    }

    async fn play(&self, track: &Track) -> Result<(), SinkError> {
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(SinkError::Playback("decoder crashed".into()));
        }
        self.played.lock().push((track.id(), track.title()));
        Ok(())
    }

    async fn stop(&self) -> Result<(), SinkError> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(SinkError::Stop("socket closed".into()));
        }
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.notifier.finished();
        Ok(())
    }

    fn is_active(&self) -> bool {
        !self.is_disconnected()
    }

    async fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct MockConnector {
    sinks: Mutex<Vec<Arc<MockSink>>>,
    refuse: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Hold the next connect until the returned handle is notified.
    pub fn hold_next_connect(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock() = Some(notify.clone());
        notify
    }

    pub fn connections(&self) -> usize {
        self.sinks.lock().len()
    }

    pub fn last_sink(&self) -> Option<Arc<MockSink>> {
        self.sinks.lock().last().cloned()
    }
}

#[async_trait]
impl VoiceConnector for MockConnector {
    async fn connect(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
        notifier: SinkNotifier,
    ) -> Result<Arc<dyn VoiceSink>, SinkError> {
        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.refuse.load(Ordering::SeqCst) {
            return Err(SinkError::Connect {
                channel: channel_id,
                reason: "gateway timeout".into(),
            });
        }
        let sink = Arc::new(MockSink::new(channel_id, notifier));
        self.sinks.lock().push(sink.clone());
        Ok(sink)
    }
}

/// A connected session with no driver running.
pub async fn connect_session(
    guild_id: GuildId,
    channel_id: ChannelId,
) -> (Arc<Session>, Arc<MockSink>) {
    let connector = MockConnector::new();
    let session = Session::connect(guild_id, channel_id, &connector, PlayerContext::new())
        .await
        .expect("mock connector always connects");
    let sink = connector.last_sink().expect("sink was recorded");
    (Arc::new(session), sink)
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Resolves every URL to ready metadata unless told otherwise.
#[derive(Default)]
pub struct ScriptedResolver {
    delay: Option<Duration>,
    failures: Mutex<HashMap<String, ResolveError>>,
    hooks: Mutex<HashMap<String, Hook>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_on(&self, url: &str, error: ResolveError) {
        self.failures.lock().insert(url.to_string(), error);
    }

    /// Run `hook` while `url` is being resolved.
    pub fn on_call(&self, url: &str, hook: impl Fn() + Send + Sync + 'static) {
        self.hooks.lock().insert(url.to_string(), Box::new(hook));
    }

    /// Hold resolution of `url` until the returned handle is notified.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().insert(url.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TrackResolver for ScriptedResolver {
    async fn resolve(&self, request: &TrackRequest) -> Result<TrackMetadata, ResolveError> {
        self.calls.lock().push(request.url.clone());

        if let Some(hook) = self.hooks.lock().get(&request.url) {
            hook();
        }
        let gate = self.gates.lock().get(&request.url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.lock().get(&request.url) {
            return Err(error.clone());
        }
        let title = request
            .url
            .rsplit('/')
            .next()
            .unwrap_or(&request.url)
            .to_string();
        Ok(metadata(&title))
    }
}
