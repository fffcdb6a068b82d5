//! Boot sequence helpers
//!
//! Storage has to be present before anything else starts: the catalog and
//! every track live on it. Until it shows up the device sits on a visible
//! "storage missing" frame.

use std::path::Path;

use tagtune_catalog::{load_from_path, LoadReport, LoadedCatalog};
use tagtune_core::{Catalog, Display, StatusFlags, StatusFrame, TrackSource};
use tagtune_storage::JsonFileSettings;
use tracing::{error, info, warn};

use crate::error::Result;

/// Frame shown while the media root is unavailable
pub fn storage_missing_frame() -> StatusFrame {
    StatusFrame {
        line1: "No memory card".to_string(),
        line2: "Insert card".to_string(),
        line3: "Retrying...".to_string(),
        volume_percent: 0,
        flags: StatusFlags::STORAGE_ERROR,
    }
}

/// Block until `tracks` is available.
///
/// `sleep` is called between attempts. Returns how many retries it took.
pub fn wait_for_storage<S>(
    tracks: &dyn TrackSource,
    display: &mut dyn Display,
    mut sleep: S,
) -> u32
where
    S: FnMut(),
{
    let mut retries = 0;
    while !tracks.is_available() {
        if retries == 0 {
            warn!("Storage unavailable, waiting");
        }
        display.render(&storage_missing_frame());
        sleep();
        retries += 1;
    }
    if retries > 0 {
        info!("Storage available after {} retries", retries);
    }
    retries
}

/// Load the catalog. The loader already logs each adjustment it made.
pub fn load_catalog(path: &Path) -> Result<LoadedCatalog> {
    let loaded = load_from_path(path)?;
    info!("Using catalog {}", path.display());
    Ok(loaded)
}

/// Load the catalog, falling back to an empty one when it cannot be read.
///
/// The device still boots: buttons, volume and a later reload keep working.
pub fn load_catalog_or_empty(path: &Path) -> LoadedCatalog {
    match load_catalog(path) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Catalog unusable, starting empty: {}", e);
            LoadedCatalog {
                catalog: Catalog::default(),
                report: LoadReport::default(),
            }
        }
    }
}

/// Open the preferences file.
pub fn open_settings(path: &Path) -> Result<JsonFileSettings> {
    let settings = JsonFileSettings::open(path)?;
    info!("Settings at {}", settings.path().display());
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyStorage {
        checks_until_ready: AtomicU32,
    }

    impl TrackSource for FlakyStorage {
        fn exists(&self, _path: &str) -> bool {
            false
        }

        fn list_dir(&self, _dir: &str) -> Vec<String> {
            Vec::new()
        }

        fn is_available(&self) -> bool {
            let left = self.checks_until_ready.load(Ordering::Relaxed);
            if left == 0 {
                return true;
            }
            self.checks_until_ready.store(left - 1, Ordering::Relaxed);
            false
        }
    }

    #[derive(Default)]
    struct Frames(Vec<StatusFrame>);

    impl Display for Frames {
        fn render(&mut self, frame: &StatusFrame) {
            self.0.push(frame.clone());
        }
    }

    #[test]
    fn test_waits_with_storage_error_frame() {
        let storage = FlakyStorage {
            checks_until_ready: AtomicU32::new(3),
        };
        let mut display = Frames::default();
        let mut sleeps = 0;

        let retries = wait_for_storage(&storage, &mut display, || sleeps += 1);

        assert_eq!(retries, 3);
        assert_eq!(sleeps, 3);
        assert_eq!(display.0.len(), 3);
        assert!(display.0[0].flags.contains(StatusFlags::STORAGE_ERROR));
    }

    #[test]
    fn test_unreadable_catalog_boots_empty() {
        let dir = tempfile::tempdir().unwrap();

        let missing = load_catalog_or_empty(&dir.path().join("missing.json"));
        assert!(missing.catalog.cards().is_empty());
        assert!(missing.catalog.games().is_empty());

        let broken = dir.path().join("cards.json");
        std::fs::write(&broken, "{ \"cards\": [").unwrap();
        assert!(load_catalog_or_empty(&broken).catalog.cards().is_empty());
    }

    #[test]
    fn test_catalog_loads_when_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cards.json");
        std::fs::write(
            &path,
            r#"{ "cards": [ { "uid": "A1", "role": "music",
                 "play": { "kind": "single", "file": "/a.mp3" } } ] }"#,
        )
        .unwrap();

        let loaded = load_catalog_or_empty(&path);
        assert!(loaded.catalog.card("a1").is_some());
    }

    #[test]
    fn test_available_storage_does_not_wait() {
        let storage = FlakyStorage {
            checks_until_ready: AtomicU32::new(0),
        };
        let mut display = Frames::default();
        assert_eq!(wait_for_storage(&storage, &mut display, || {}), 0);
        assert!(display.0.is_empty());
    }
}
