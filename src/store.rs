use std::collections::BTreeMap;

use crate::{Detection, Track};

/// Tracks of one stream keyed by id, together with the id sequence.
///
/// `next_id` lives beside the tracks so ids keep growing after the tracks
/// that held them are gone. `u32::MAX` is never issued: once `next_id`
/// reaches it the sequence is exhausted and no more tracks spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStore {
    tracks: BTreeMap<u32, Track>,
    next_id: u32,
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackStore {
    pub fn new() -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Empty store continuing the id sequence of `self`.
    pub(crate) fn successor(&self) -> Self {
        Self {
            tracks: BTreeMap::new(),
            next_id: self.next_id,
        }
    }

    /// Splits into the successor store and the tracks in ascending id order.
    pub(crate) fn into_successor(self) -> (Self, Vec<Track>) {
        let next = self.successor();

        (next, self.tracks.into_values().collect())
    }

    /// New track from `det`, `None` when the id sequence is exhausted.
    pub(crate) fn spawn(&mut self, det: &Detection) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.tracks.insert(id, Track::spawn(id, det));

        Some(id)
    }

    pub(crate) fn insert(&mut self, track: Track) {
        debug_assert!(track.track_id < self.next_id || self.is_exhausted());
        self.tracks.insert(track.track_id, track);
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in ascending id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Id the next spawned track will get.
    #[inline]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.next_id == u32::MAX
    }

    #[inline]
    pub fn max_id(&self) -> Option<u32> {
        self.tracks.keys().next_back().copied()
    }

    /// Confirmed tracks, those with at least `min_hits` matches.
    pub fn visible(&self, min_hits: u32) -> Vec<&Track> {
        self.tracks
            .values()
            .filter(|t| t.is_confirmed(min_hits))
            .collect()
    }
}

impl FromIterator<Track> for TrackStore {
    /// Builds a store from existing tracks; the id sequence continues after
    /// the largest id seen.
    fn from_iter<I: IntoIterator<Item = Track>>(iter: I) -> Self {
        let mut store = TrackStore::new();

        for track in iter {
            store.next_id = store.next_id.max(track.track_id.saturating_add(1));
            store.tracks.insert(track.track_id, track);
        }

        store
    }
}
