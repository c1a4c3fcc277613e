use std::{collections::VecDeque, sync::Arc};

use rand::seq::SliceRandom;

use crate::protocol::tracks::{Track, TrackSummary};

/// Ordered tracks waiting to be played. Insertion order is playback order.
#[derive(Debug, Default, Clone)]
pub struct Queue {
    tracks: VecDeque<Arc<Track>>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn push_back(&mut self, track: Arc<Track>) {
        self.tracks.push_back(track);
    }

    pub fn extend<I>(&mut self, tracks: I)
    where
        I: IntoIterator<Item = Arc<Track>>,
    {
        self.tracks.extend(tracks)
    }

    pub fn front(&self) -> Option<&Arc<Track>> {
        self.tracks.front()
    }

    pub fn pop_front(&mut self) -> Option<Arc<Track>> {
        self.tracks.pop_front()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Track>> {
        self.tracks.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Arc<Track>> {
        self.tracks.remove(index)
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&mut self) -> usize {
        let len = self.tracks.len();
        self.tracks.clear();
        len
    }

    pub fn shuffle(&mut self) {
        self.tracks.make_contiguous().shuffle(&mut rand::thread_rng());
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Track>> {
        self.tracks.iter()
    }

    /// Sum of known durations. Unresolved and live entries count as zero.
    pub fn total_duration_ms(&self) -> u64 {
        self.tracks.iter().filter_map(|t| t.duration_ms()).sum()
    }

    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.tracks.iter().map(|t| t.summary()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::types::UserId,
        protocol::tracks::{Requester, TrackMetadata, TrackRequest},
    };

    fn track(name: &str, duration_ms: Option<u64>) -> Arc<Track> {
        let track = Track::new(TrackRequest::new(
            format!("https://example.com/{name}"),
            Requester {
                id: UserId(1),
                name: "one".into(),
            },
        ));
        if let Some(duration_ms) = duration_ms {
            track.mark_ready(TrackMetadata {
                title: name.to_string(),
                uploader: "someone".into(),
                duration_ms: Some(duration_ms),
                thumbnail: None,
            });
        }
        Arc::new(track)
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = Queue::new();
        let (a, b, c) = (track("a", None), track("b", None), track("c", None));
        queue.push_back(a.clone());
        queue.extend([b.clone(), c.clone()]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().map(|t| t.id()), Some(a.id()));
        assert_eq!(queue.pop_front().map(|t| t.id()), Some(a.id()));
        assert_eq!(queue.pop_front().map(|t| t.id()), Some(b.id()));
        assert_eq!(queue.pop_front().map(|t| t.id()), Some(c.id()));
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut queue = Queue::new();
        let (a, b) = (track("a", None), track("b", None));
        queue.extend([a.clone(), b.clone()]);

        assert_eq!(queue.remove(1).map(|t| t.id()), Some(b.id()));
        assert!(queue.remove(5).is_none());
        assert_eq!(queue.clear(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_shuffle_keeps_entries() {
        let mut queue = Queue::new();
        let tracks: Vec<_> = (0..20).map(|i| track(&i.to_string(), None)).collect();
        queue.extend(tracks.iter().cloned());
        queue.shuffle();

        assert_eq!(queue.len(), 20);
        for t in &tracks {
            assert!(queue.iter().any(|q| q.id() == t.id()));
        }
    }

    #[test]
    fn test_total_duration_skips_unresolved() {
        let mut queue = Queue::new();
        queue.extend([
            track("a", Some(1_000)),
            track("b", None),
            track("c", Some(2_500)),
        ]);
        assert_eq!(queue.total_duration_ms(), 3_500);
    }
}
