//! Media directory as a track source
//!
//! Catalog paths are absolute (`/music/a.mp3`) and resolve beneath the media
//! root, the way they resolve beneath the card's root on the device.

use std::fs;
use std::path::{Component, Path, PathBuf};

use tagtune_core::TrackSource;
use tracing::debug;

/// Tracks and cues read from a directory tree
#[derive(Debug, Clone)]
pub struct FsTrackSource {
    root: PathBuf,
}

impl FsTrackSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a catalog path.
    ///
    /// `None` for paths that would climb out of the media root.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            debug!("Rejecting path outside media root: {}", path);
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl TrackSource for FsTrackSource {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn list_dir(&self, dir: &str) -> Vec<String> {
        let Some(dir_path) = self.resolve(dir) else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(&dir_path) else {
            debug!("Cannot list {}", dir_path.display());
            return Vec::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect()
    }

    fn is_available(&self) -> bool {
        self.root.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn media() -> (TempDir, FsTrackSource) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("album/sub")).unwrap();
        fs::write(dir.path().join("album/01.mp3"), b"x").unwrap();
        fs::write(dir.path().join("album/02.mp3"), b"x").unwrap();
        fs::write(dir.path().join("top.mp3"), b"x").unwrap();
        let source = FsTrackSource::new(dir.path());
        (dir, source)
    }

    #[test]
    fn test_exists_resolves_under_root() {
        let (_dir, source) = media();
        assert!(source.exists("/album/01.mp3"));
        assert!(source.exists("/top.mp3"));
        assert!(!source.exists("/album/03.mp3"));
        // Directories are not tracks
        assert!(!source.exists("/album"));
    }

    #[test]
    fn test_list_dir_returns_file_names_only() {
        let (_dir, source) = media();
        let mut names = source.list_dir("/album");
        names.sort();
        assert_eq!(names, ["01.mp3", "02.mp3"]);

        assert!(source.list_dir("/").contains(&"top.mp3".to_string()));
        assert!(source.list_dir("/missing").is_empty());
    }

    #[test]
    fn test_parent_components_rejected() {
        let (_dir, source) = media();
        assert_eq!(source.resolve("/../etc/passwd"), None);
        assert!(!source.exists("/album/../top.mp3"));
    }

    #[test]
    fn test_availability_follows_root() {
        let (dir, source) = media();
        assert!(source.is_available());
        drop(dir);
        assert!(!source.is_available());
    }
}
