//! Key-value preference stores
//!
//! Two implementations of [`SettingsStore`]:
//! - [`MemorySettings`] for tests and diskless runs
//! - [`JsonFileSettings`], one JSON object per file, rewritten on every put
//!
//! Writes to the file store go to a sibling temp file that is then renamed
//! over the previous one, so a power cut leaves either the old or the new file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tagtune_core::SettingsStore;
use tracing::{debug, warn};

use crate::error::{Result, StorageError};

// Setting key constants
/// Volume in percent (0-100)
pub const KEY_VOLUME: &str = "vol_x100";

/// Last music track started
pub const KEY_LAST_PATH: &str = "last_path";

type Entries = BTreeMap<String, Value>;

fn string_of(entries: &Entries, key: &str) -> Option<String> {
    entries.get(key).and_then(Value::as_str).map(str::to_string)
}

fn int_of(entries: &Entries, key: &str) -> Option<i64> {
    entries.get(key).and_then(Value::as_i64)
}

// ===== In-memory =====

/// Settings held in memory only
#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    entries: Entries,
    writes: usize,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of puts so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SettingsStore for MemorySettings {
    fn get_string(&self, key: &str) -> Option<String> {
        string_of(&self.entries, key)
    }

    fn put_string(&mut self, key: &str, value: &str) -> tagtune_core::Result<()> {
        self.entries.insert(key.to_string(), Value::from(value));
        self.writes += 1;
        Ok(())
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        int_of(&self.entries, key)
    }

    fn put_int(&mut self, key: &str, value: i64) -> tagtune_core::Result<()> {
        self.entries.insert(key.to_string(), Value::from(value));
        self.writes += 1;
        Ok(())
    }
}

// ===== JSON file =====

/// Settings persisted as a JSON object
#[derive(Debug)]
pub struct JsonFileSettings {
    path: PathBuf,
    entries: Entries,
}

impl JsonFileSettings {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. A file that does not parse is
    /// logged and replaced by an empty store on the next put.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Entries>(&text) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                    Entries::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, starting empty", path.display());
                Entries::new()
            }
            Err(e) => return Err(StorageError::io(path, e)),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        }

        let text = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get_string(&self, key: &str) -> Option<String> {
        string_of(&self.entries, key)
    }

    fn put_string(&mut self, key: &str, value: &str) -> tagtune_core::Result<()> {
        Ok(self.put(key, Value::from(value))?)
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        int_of(&self.entries, key)
    }

    fn put_int(&mut self, key: &str, value: i64) -> tagtune_core::Result<()> {
        Ok(self.put(key, Value::from(value))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_roundtrip_and_types() {
        let mut settings = MemorySettings::new();
        settings.put_int(KEY_VOLUME, 55).unwrap();
        settings.put_string(KEY_LAST_PATH, "/a/b.mp3").unwrap();

        assert_eq!(settings.get_int(KEY_VOLUME), Some(55));
        assert_eq!(settings.get_string(KEY_LAST_PATH).as_deref(), Some("/a/b.mp3"));
        // Wrong type reads as absent
        assert_eq!(settings.get_int(KEY_LAST_PATH), None);
        assert_eq!(settings.writes(), 2);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs/player.json");

        let mut settings = JsonFileSettings::open(&path).unwrap();
        assert_eq!(settings.get_int(KEY_VOLUME), None);
        settings.put_int(KEY_VOLUME, 35).unwrap();
        settings.put_string(KEY_LAST_PATH, "/x.mp3").unwrap();

        let reopened = JsonFileSettings::open(&path).unwrap();
        assert_eq!(reopened.get_int(KEY_VOLUME), Some(35));
        assert_eq!(reopened.get_string(KEY_LAST_PATH).as_deref(), Some("/x.mp3"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("player.json");
        fs::write(&path, "{ not json").unwrap();

        let mut settings = JsonFileSettings::open(&path).unwrap();
        assert_eq!(settings.get_int(KEY_VOLUME), None);

        settings.put_int(KEY_VOLUME, 10).unwrap();
        let reopened = JsonFileSettings::open(&path).unwrap();
        assert_eq!(reopened.get_int(KEY_VOLUME), Some(10));
    }
}
