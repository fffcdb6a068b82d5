//! Active playlist building and navigation
//!
//! The playlist is rebuilt wholesale on every music selection and never
//! merged. Navigation wraps; an exhausted auto-advancing playlist restarts
//! from the top on the next explicit play.

use tagtune_core::limits::MAX_PLAYLIST;
use tagtune_core::{TrackItem, TrackSource};
use tracing::{debug, warn};

/// Extension of playable files, matched case-insensitively
pub const PLAYABLE_EXTENSION: &str = "mp3";

/// Whether a file name has the playable extension.
pub fn is_playable(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && ext.eq_ignore_ascii_case(PLAYABLE_EXTENSION))
}

/// Directory part of an absolute path; `/` for top-level files.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

/// Join a directory and a file name with exactly one separator.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Ordered track paths plus a cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivePlaylist {
    tracks: Vec<String>,
    index: Option<usize>,
    auto_advance: bool,
    ended: bool,
}

impl ActivePlaylist {
    // ===== Building =====

    /// Replace the playlist. `index` is clamped into range.
    pub fn set_tracks(&mut self, mut tracks: Vec<String>, index: usize, auto_advance: bool) {
        if tracks.len() > MAX_PLAYLIST {
            warn!(
                "Playlist truncated to {} of {} entries",
                MAX_PLAYLIST,
                tracks.len()
            );
            tracks.truncate(MAX_PLAYLIST);
        }
        self.index = if tracks.is_empty() {
            None
        } else {
            Some(index.min(tracks.len() - 1))
        };
        self.tracks = tracks;
        self.auto_advance = auto_advance;
        self.ended = false;
    }

    /// Browse the directory of a single file; no auto-advance.
    ///
    /// Returns the path to play: the selected file's position in the sorted
    /// listing, or the first entry if it is not listed. An empty listing
    /// yields a playlist of just the file.
    pub fn select_single(&mut self, source: &dyn TrackSource, path: &str) -> Option<String> {
        let tracks = list_playable(source, dirname(path));
        if tracks.is_empty() {
            debug!("No playable siblings for {}, playing it alone", path);
            self.set_tracks(vec![path.to_string()], 0, false);
        } else {
            let index = tracks.iter().position(|t| t == path).unwrap_or(0);
            self.set_tracks(tracks, index, false);
        }
        self.current().map(str::to_string)
    }

    /// Every playable file in `folder`, from the top, auto-advancing.
    pub fn select_folder(&mut self, source: &dyn TrackSource, folder: &str) -> Option<String> {
        let tracks = list_playable(source, folder);
        if tracks.is_empty() {
            warn!("Album folder {} has no playable tracks", folder);
        }
        self.set_tracks(tracks, 0, true);
        self.current().map(str::to_string)
    }

    /// Tracks in their declared order, from the top, auto-advancing.
    pub fn select_tracks(&mut self, items: &[TrackItem]) -> Option<String> {
        self.set_tracks(items.iter().map(|t| t.file.clone()).collect(), 0, true);
        self.current().map(str::to_string)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    // ===== Navigation =====

    /// Step forward, wrapping. An ended playlist restarts at the top with
    /// auto-advance re-armed.
    pub fn next(&mut self) -> Option<String> {
        if self.tracks.is_empty() {
            return None;
        }
        if self.ended {
            return self.restart();
        }
        let next = self.index.map_or(0, |i| (i + 1) % self.tracks.len());
        self.jump(next)
    }

    /// Step back, wrapping.
    pub fn prev(&mut self) -> Option<String> {
        if self.tracks.is_empty() {
            return None;
        }
        let prev = match self.index {
            Some(0) | None => self.tracks.len() - 1,
            Some(i) => i - 1,
        };
        self.jump(prev)
    }

    /// Restart an ended playlist at the top. `None` unless ended.
    pub fn restart(&mut self) -> Option<String> {
        if !self.ended || self.tracks.is_empty() {
            return None;
        }
        self.ended = false;
        self.auto_advance = true;
        self.jump(0)
    }

    /// Move to `index` if it exists.
    pub fn jump(&mut self, index: usize) -> Option<String> {
        let path = self.tracks.get(index)?.clone();
        self.index = Some(index);
        Some(path)
    }

    /// The last entry finished: stop auto-advancing until the user restarts.
    pub fn mark_ended(&mut self) {
        self.ended = true;
        self.auto_advance = false;
    }

    /// Stop auto-advancing without discarding the list (game start).
    pub fn disable_auto_advance(&mut self) {
        self.auto_advance = false;
    }

    // ===== Accessors =====

    pub fn current(&self) -> Option<&str> {
        self.index
            .and_then(|i| self.tracks.get(i))
            .map(String::as_str)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

/// Sorted absolute paths of the playable files in `dir`.
fn list_playable(source: &dyn TrackSource, dir: &str) -> Vec<String> {
    let mut names: Vec<String> = source
        .list_dir(dir)
        .into_iter()
        .filter(|name| is_playable(name))
        .collect();
    names.sort();
    names.into_iter().map(|name| join_path(dir, &name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeSource {
        dirs: HashMap<String, Vec<String>>,
    }

    impl FakeSource {
        fn new(dirs: &[(&str, &[&str])]) -> Self {
            Self {
                dirs: dirs
                    .iter()
                    .map(|(d, names)| (d.to_string(), names.iter().map(|n| n.to_string()).collect()))
                    .collect(),
            }
        }
    }

    impl TrackSource for FakeSource {
        fn exists(&self, path: &str) -> bool {
            self.dirs
                .get(dirname(path))
                .is_some_and(|names| names.iter().any(|n| join_path(dirname(path), n) == path))
        }

        fn list_dir(&self, dir: &str) -> Vec<String> {
            self.dirs.get(dir).cloned().unwrap_or_default()
        }
    }

    fn playlist_of(n: usize) -> ActivePlaylist {
        let mut p = ActivePlaylist::default();
        p.set_tracks((0..n).map(|i| format!("/t/{i}.mp3")).collect(), 0, true);
        p
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(dirname("/a/b.mp3"), "/a");
        assert_eq!(dirname("/b.mp3"), "/");
        assert_eq!(join_path("/", "b.mp3"), "/b.mp3");
        assert_eq!(join_path("/a", "b.mp3"), "/a/b.mp3");
        assert!(is_playable("Song.MP3"));
        assert!(!is_playable("cover.jpg"));
        assert!(!is_playable(".mp3"));
    }

    #[test]
    fn test_select_single_browses_sorted_siblings() {
        let source = FakeSource::new(&[("/a", &["c.mp3", "b.mp3", "notes.txt", "A.Mp3"])]);
        let mut playlist = ActivePlaylist::default();

        let path = playlist.select_single(&source, "/a/b.mp3");

        assert_eq!(path.as_deref(), Some("/a/b.mp3"));
        assert_eq!(playlist.tracks(), ["/a/A.Mp3", "/a/b.mp3", "/a/c.mp3"]);
        assert_eq!(playlist.index(), Some(1));
        assert!(!playlist.auto_advance());
    }

    #[test]
    fn test_select_single_not_listed_starts_at_zero() {
        let source = FakeSource::new(&[("/a", &["x.mp3", "y.mp3"])]);
        let mut playlist = ActivePlaylist::default();

        let path = playlist.select_single(&source, "/a/missing.mp3");
        assert_eq!(path.as_deref(), Some("/a/x.mp3"));
        assert_eq!(playlist.index(), Some(0));
    }

    #[test]
    fn test_select_single_empty_dir_plays_file_alone() {
        let source = FakeSource::new(&[]);
        let mut playlist = ActivePlaylist::default();

        let path = playlist.select_single(&source, "/solo/one.mp3");
        assert_eq!(path.as_deref(), Some("/solo/one.mp3"));
        assert_eq!(playlist.len(), 1);
    }

    #[test]
    fn test_select_folder_and_tracks_auto_advance() {
        let source = FakeSource::new(&[("/album", &["02.mp3", "01.mp3"])]);
        let mut playlist = ActivePlaylist::default();

        assert_eq!(
            playlist.select_folder(&source, "/album").as_deref(),
            Some("/album/01.mp3")
        );
        assert!(playlist.auto_advance());

        let items = [TrackItem::from_path("/z/9.mp3"), TrackItem::from_path("/a/1.mp3")];
        assert_eq!(playlist.select_tracks(&items).as_deref(), Some("/z/9.mp3"));
        // Declared order, not sorted
        assert_eq!(playlist.tracks(), ["/z/9.mp3", "/a/1.mp3"]);
        assert!(playlist.auto_advance());
    }

    #[test]
    fn test_next_prev_wrap() {
        let mut playlist = playlist_of(3);
        playlist.jump(2);
        assert_eq!(playlist.next().as_deref(), Some("/t/0.mp3"));
        assert_eq!(playlist.prev().as_deref(), Some("/t/2.mp3"));
    }

    #[test]
    fn test_empty_navigation_is_noop() {
        let mut playlist = ActivePlaylist::default();
        assert_eq!(playlist.next(), None);
        assert_eq!(playlist.prev(), None);
        assert_eq!(playlist.index(), None);
    }

    #[test]
    fn test_ended_playlist_restarts_on_next() {
        let mut playlist = playlist_of(3);
        playlist.jump(2);
        playlist.mark_ended();
        assert!(!playlist.auto_advance());

        assert_eq!(playlist.next().as_deref(), Some("/t/0.mp3"));
        assert!(playlist.auto_advance());
        assert!(!playlist.is_ended());
    }

    #[test]
    fn test_playlist_ceiling() {
        let playlist = playlist_of(MAX_PLAYLIST + 20);
        assert_eq!(playlist.len(), MAX_PLAYLIST);
    }
}
