//! Track items and the fixed-capacity track pool

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::limits::MAX_POOL_TRACKS;

/// Ensure a catalog path is absolute (leading `/`).
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// One playable track declared in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackItem {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Absolute path on the track source
    pub file: String,
}

impl TrackItem {
    pub fn from_path(file: &str) -> Self {
        Self {
            title: None,
            artist: None,
            file: normalize_path(file),
        }
    }
}

/// A contiguous run of tracks inside a [`TrackPool`].
///
/// Only the pool hands these out, so `start + count` never exceeds the pool
/// length it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSlice {
    start: usize,
    count: usize,
}

impl PoolSlice {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Flat bump-allocated storage for album tracks
#[derive(Debug, Clone)]
pub struct TrackPool {
    items: Vec<TrackItem>,
    capacity: usize,
}

impl Default for TrackPool {
    fn default() -> Self {
        Self::with_capacity(MAX_POOL_TRACKS)
    }
}

impl TrackPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Append an album's tracks, returning the slice that holds them and how
    /// many tracks did not fit.
    pub fn append_album<I>(&mut self, tracks: I) -> (PoolSlice, usize)
    where
        I: IntoIterator<Item = TrackItem>,
    {
        let start = self.items.len();
        let mut dropped = 0;
        for track in tracks {
            if self.items.len() < self.capacity {
                self.items.push(track);
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            warn!(
                "Track pool full ({} tracks), {} album tracks dropped",
                self.capacity, dropped
            );
        }
        let slice = PoolSlice {
            start,
            count: self.items.len() - start,
        };
        (slice, dropped)
    }

    /// Tracks covered by `slice`. Empty if the slice is from another pool.
    pub fn slice(&self, slice: PoolSlice) -> &[TrackItem] {
        self.items
            .get(slice.start..slice.start + slice.count)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(n: usize) -> Vec<TrackItem> {
        (0..n)
            .map(|i| TrackItem::from_path(&format!("album/{i:02}.mp3")))
            .collect()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("a/b.mp3"), "/a/b.mp3");
        assert_eq!(normalize_path("/a/b.mp3"), "/a/b.mp3");
    }

    #[test]
    fn test_append_album_slices_are_contiguous() {
        let mut pool = TrackPool::default();
        let (first, _) = pool.append_album(tracks(3));
        let (second, _) = pool.append_album(tracks(2));

        assert_eq!(first.start(), 0);
        assert_eq!(second.start(), 3);
        assert_eq!(pool.slice(second).len(), 2);
        assert_eq!(pool.slice(first)[1].file, "/album/01.mp3");
    }

    #[test]
    fn test_append_album_truncates_at_capacity() {
        let mut pool = TrackPool::with_capacity(4);
        let (first, dropped) = pool.append_album(tracks(3));
        assert_eq!(dropped, 0);
        assert_eq!(first.count(), 3);

        let (second, dropped) = pool.append_album(tracks(3));
        assert_eq!(second.count(), 1);
        assert_eq!(dropped, 2);
        assert_eq!(pool.len(), 4);

        let (third, dropped) = pool.append_album(tracks(1));
        assert!(third.is_empty());
        assert_eq!(dropped, 1);
    }
}
