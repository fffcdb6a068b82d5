/// Device configuration
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::controller::ControllerOptions;
use crate::error::{PlayerError, Result};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "tagtune.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    #[serde(default = "default_paths")]
    pub paths: PathSettings,

    #[serde(default = "default_timing")]
    pub timing: TimingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathSettings {
    /// Directory standing in for the memory card; catalog paths resolve here
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Catalog document; relative paths are taken from the media root
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,

    /// Preferences file (volume, last track)
    #[serde(default = "default_settings")]
    pub settings: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingSettings {
    #[serde(default = "default_rfid_poll_ms")]
    pub rfid_poll_ms: u32,

    #[serde(default = "default_volume_save_delay_ms")]
    pub volume_save_delay_ms: u32,

    #[serde(default = "default_early_scan_ttl_ms")]
    pub early_scan_ttl_ms: u32,

    #[serde(default = "default_display_refresh_ms")]
    pub display_refresh_ms: u32,

    #[serde(default = "default_storage_retry_ms")]
    pub storage_retry_ms: u32,

    /// Sleep between control loop iterations
    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            timing: default_timing(),
        }
    }
}

impl DeviceConfig {
    /// Load configuration from a file and the environment.
    ///
    /// With no explicit `path`, `tagtune.toml` in the working directory is
    /// used when present. `TAGTUNE_*` variables override file values, with
    /// `__` between section and key (`TAGTUNE_PATHS__MEDIA_ROOT`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("TAGTUNE")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.paths.media_root.as_os_str().is_empty() {
            return Err(PlayerError::Config("paths.media_root must be set".into()));
        }
        let t = &self.timing;
        for (name, value) in [
            ("timing.rfid_poll_ms", t.rfid_poll_ms),
            ("timing.display_refresh_ms", t.display_refresh_ms),
            ("timing.storage_retry_ms", t.storage_retry_ms),
        ] {
            if value == 0 {
                return Err(PlayerError::Config(format!("{name} must be positive")));
            }
        }
        if t.early_scan_ttl_ms > 60_000 {
            return Err(PlayerError::Config(
                "timing.early_scan_ttl_ms must not exceed 60000".into(),
            ));
        }
        Ok(())
    }

    /// Catalog location with relative paths resolved against the media root
    pub fn catalog_path(&self) -> PathBuf {
        if self.paths.catalog.is_absolute() {
            self.paths.catalog.clone()
        } else {
            self.paths.media_root.join(&self.paths.catalog)
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            rfid_poll_ms: self.timing.rfid_poll_ms,
            volume_save_delay_ms: self.timing.volume_save_delay_ms,
            early_scan_ttl_ms: self.timing.early_scan_ttl_ms,
            display_refresh_ms: self.timing.display_refresh_ms,
        }
    }
}

// Default value functions
fn default_paths() -> PathSettings {
    PathSettings {
        media_root: default_media_root(),
        catalog: default_catalog(),
        settings: default_settings(),
    }
}

fn default_timing() -> TimingSettings {
    TimingSettings {
        rfid_poll_ms: default_rfid_poll_ms(),
        volume_save_delay_ms: default_volume_save_delay_ms(),
        early_scan_ttl_ms: default_early_scan_ttl_ms(),
        display_refresh_ms: default_display_refresh_ms(),
        storage_retry_ms: default_storage_retry_ms(),
        loop_interval_ms: default_loop_interval_ms(),
    }
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}

fn default_catalog() -> PathBuf {
    PathBuf::from("cards.json")
}

fn default_settings() -> PathBuf {
    PathBuf::from("./tagtune-settings.json")
}

fn default_rfid_poll_ms() -> u32 {
    25
}

fn default_volume_save_delay_ms() -> u32 {
    800
}

fn default_early_scan_ttl_ms() -> u32 {
    5_000
}

fn default_display_refresh_ms() -> u32 {
    1_000
}

fn default_storage_retry_ms() -> u32 {
    1_000
}

fn default_loop_interval_ms() -> u32 {
    2
}
