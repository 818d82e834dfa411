//! User configuration for threadpost.
//!
//! Read once at startup from `$XDG_CONFIG_HOME/threadpost/config.toml`
//! (falling back to `~/.config/threadpost/config.toml`). Every key is
//! optional. A missing file or a parse error is a soft failure: a message goes
//! to stderr and the defaults are used.
//!
//! ```toml
//! theme = "dark"
//! author = "zerohch0"
//! media_dir = "/home/me/Pictures"
//! camera_fixture = "/home/me/fixtures/capture.jpg"
//!
//! [permissions]
//! camera = true
//! photo_library = true
//! location = false
//! media_save = true
//!
//! [location]
//! latitude = 37.5665
//! longitude = 126.978
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use threadpost_core::capability::PermissionKind;
use threadpost_core::types::Coordinate;

/// Which device capabilities the user has granted.
///
/// This file plays the role of the system settings screen: the permission
/// prompt's "Open settings" hand-off points the user here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PermissionGrants {
    pub camera: bool,
    pub photo_library: bool,
    pub location: bool,
    pub media_save: bool,
}

impl Default for PermissionGrants {
    fn default() -> Self {
        Self { camera: true, photo_library: true, location: true, media_save: true }
    }
}

impl PermissionGrants {
    pub fn allows(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::Camera => self.camera,
            PermissionKind::PhotoLibrary => self.photo_library,
            PermissionKind::Location => self.location,
            PermissionKind::MediaSave => self.media_save,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    /// Handle the thread is posted as.
    pub author: String,
    /// Directory served as the photo library. Defaults to `~/Pictures`.
    pub media_dir: Option<PathBuf>,
    /// File copied into the capture directory each time the camera "shoots".
    /// Without it the camera reports itself unavailable.
    pub camera_fixture: Option<PathBuf>,
    /// Post store location. Defaults to `<data dir>/posts.db`.
    pub database: Option<PathBuf>,
    /// Log file. Defaults to `<data dir>/threadpost.log`.
    pub log_file: Option<PathBuf>,
    pub permissions: PermissionGrants,
    /// Fixed reading returned by the location provider.
    pub location: Option<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            author: std::env::var("USER").unwrap_or_else(|_| "me".to_owned()),
            media_dir: None,
            camera_fixture: None,
            database: None,
            log_file: None,
            permissions: PermissionGrants::default(),
            location: None,
        }
    }
}

impl Config {
    pub fn media_dir(&self) -> PathBuf {
        self.media_dir.clone().unwrap_or_else(|| home_dir().join("Pictures"))
    }

    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| data_dir().join("posts.db"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| data_dir().join("threadpost.log"))
    }

    pub fn capture_dir(&self) -> PathBuf {
        data_dir().join("captures")
    }
}

fn home_dir() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."))
}

/// Returns the path to the threadpost config file.
///
/// Prefers `$XDG_CONFIG_HOME/threadpost/config.toml`; falls back to
/// `~/.config/threadpost/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"));
    base.join("threadpost").join("config.toml")
}

/// `$XDG_DATA_HOME/threadpost`, or `~/.local/share/threadpost`.
pub fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .ok()
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".local").join("share"));
    base.join("threadpost")
}

/// Loads the config from [`config_path`]. Never fails.
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Config {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return Config::default(),
    };
    match parse_config(&raw) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("threadpost: config parse error in {:?}: {}", path, e);
            Config::default()
        }
    }
}

fn parse_config(raw: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(raw)
}
