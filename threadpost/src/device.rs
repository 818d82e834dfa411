//! Desktop stand-ins for the phone capabilities the composer expects.
//!
//! - permissions come from the `[permissions]` table of the config file
//! - the photo library is a directory of image/video files (newest first)
//! - the camera copies a fixture file into the capture directory
//! - the gallery save copies a capture back into the media directory
//! - location is a fixed coordinate from config
//! - "system settings" is the config file itself
//!
//! Dismissal is forwarded to the event loop as `AppEvent::Dismissed`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use threadpost_core::capability::{
    LocationProvider, MediaProvider, Navigator, PermissionKind, PermissionProvider,
    PermissionStatus, PickOutcome, PickerConfig, SettingsProvider,
};
use threadpost_core::error::CapabilityError;
use threadpost_core::types::{Attachment, Coordinate};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::config::{Config, PermissionGrants};
use crate::event::AppEvent;

const MEDIA_EXTENSIONS: &[&str] =
    &["jpg", "jpeg", "png", "gif", "webp", "heic", "mp4", "mov", "m4v", "webm"];

pub struct DesktopDevice {
    grants: PermissionGrants,
    media_dir: PathBuf,
    capture_dir: PathBuf,
    camera_fixture: Option<PathBuf>,
    location: Option<Coordinate>,
    settings_path: PathBuf,
    tx: UnboundedSender<AppEvent>,
}

impl DesktopDevice {
    pub fn new(config: &Config, settings_path: PathBuf, tx: UnboundedSender<AppEvent>) -> Self {
        Self {
            grants: config.permissions,
            media_dir: config.media_dir(),
            capture_dir: config.capture_dir(),
            camera_fixture: config.camera_fixture.clone(),
            location: config.location,
            settings_path,
            tx,
        }
    }
}

/// `file://` URI for a local path.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn path_from_uri(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}

fn is_media(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MEDIA_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists media files in `dir`, newest first.
async fn scan_media(dir: &Path) -> Result<Vec<PathBuf>, CapabilityError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_media(&path) {
            continue;
        }
        let meta = entry.metadata().await?;
        if meta.is_file() {
            found.push((meta.modified().unwrap_or(SystemTime::UNIX_EPOCH), path));
        }
    }
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

#[async_trait]
impl PermissionProvider for DesktopDevice {
    async fn request_permission(&self, kind: PermissionKind) -> PermissionStatus {
        if self.grants.allows(kind) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

#[async_trait]
impl MediaProvider for DesktopDevice {
    async fn pick_from_library(&self, config: PickerConfig) -> Result<PickOutcome, CapabilityError> {
        let limit = if config.multi_select { config.max_count } else { 1 };
        let picked: Vec<Attachment> = scan_media(&self.media_dir)
            .await?
            .into_iter()
            .take(limit)
            .map(|p| Attachment::library(file_uri(&p)))
            .collect();
        if picked.is_empty() {
            debug!(dir = %self.media_dir.display(), "no media to pick");
            return Ok(PickOutcome::Cancelled);
        }
        Ok(PickOutcome::Picked(picked))
    }

    async fn capture_from_camera(
        &self,
        _config: PickerConfig,
    ) -> Result<PickOutcome, CapabilityError> {
        let Some(fixture) = &self.camera_fixture else {
            return Err(CapabilityError::Unavailable("no camera_fixture configured".to_owned()));
        };
        let ext = fixture.extension().and_then(|e| e.to_str()).unwrap_or("jpg");
        tokio::fs::create_dir_all(&self.capture_dir).await?;
        let target = self.capture_dir.join(format!("capture-{}.{ext}", uuid::Uuid::new_v4()));
        tokio::fs::copy(fixture, &target).await?;
        debug!(path = %target.display(), "captured");
        Ok(PickOutcome::Picked(vec![Attachment::camera(file_uri(&target))]))
    }

    async fn save_to_device_library(&self, attachment: &Attachment) -> Result<(), CapabilityError> {
        let source = path_from_uri(&attachment.uri);
        let name = source
            .file_name()
            .ok_or_else(|| CapabilityError::Failed(format!("not a file: {}", attachment.uri)))?;
        tokio::fs::create_dir_all(&self.media_dir).await?;
        tokio::fs::copy(&source, self.media_dir.join(name)).await?;
        Ok(())
    }
}

#[async_trait]
impl LocationProvider for DesktopDevice {
    async fn current_location(&self) -> Result<Coordinate, CapabilityError> {
        self.location
            .ok_or_else(|| CapabilityError::Unavailable("no [location] configured".to_owned()))
    }
}

#[async_trait]
impl SettingsProvider for DesktopDevice {
    async fn open_system_settings(&self) -> Result<(), CapabilityError> {
        info!(path = %self.settings_path.display(), "permissions are managed in the config file");
        Ok(())
    }
}

impl Navigator for DesktopDevice {
    fn dismiss(&self) {
        let _ = self.tx.send(AppEvent::Dismissed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(media_dir: &Path, capture_dir: &Path) -> DesktopDevice {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        DesktopDevice {
            grants: PermissionGrants { location: false, ..PermissionGrants::default() },
            media_dir: media_dir.to_path_buf(),
            capture_dir: capture_dir.to_path_buf(),
            camera_fixture: None,
            location: None,
            settings_path: PathBuf::from("config.toml"),
            tx,
        }
    }

    #[tokio::test]
    async fn library_picks_media_only_and_respects_limit() {
        let media = tempfile::TempDir::new().unwrap();
        for name in ["a.jpg", "b.PNG", "c.mp4", "notes.txt", "d.gif", "e.webp", "f.heic"] {
            std::fs::write(media.path().join(name), b"x").unwrap();
        }
        let d = device(media.path(), media.path());

        let outcome = d.pick_from_library(PickerConfig::default()).await.unwrap();
        let PickOutcome::Picked(items) = outcome else {
            panic!("expected a pick");
        };
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|a| a.uri.starts_with("file://")));
        assert!(items.iter().all(|a| !a.uri.ends_with(".txt")));

        let single = PickerConfig { multi_select: false, max_count: 5 };
        let PickOutcome::Picked(one) = d.pick_from_library(single).await.unwrap() else {
            panic!("expected a pick");
        };
        assert_eq!(one.len(), 1);
    }

    #[tokio::test]
    async fn empty_library_counts_as_cancelled() {
        let media = tempfile::TempDir::new().unwrap();
        let d = device(media.path(), media.path());
        assert_eq!(
            d.pick_from_library(PickerConfig::default()).await.unwrap(),
            PickOutcome::Cancelled
        );
    }

    #[tokio::test]
    async fn camera_copies_fixture_and_gallery_save_copies_back() {
        let media = tempfile::TempDir::new().unwrap();
        let captures = tempfile::TempDir::new().unwrap();
        let fixture = captures.path().join("fixture.jpg");
        std::fs::write(&fixture, b"jpeg").unwrap();
        let mut d = device(media.path(), &captures.path().join("out"));

        assert!(d.capture_from_camera(PickerConfig::default()).await.is_err());

        d.camera_fixture = Some(fixture);
        let PickOutcome::Picked(shot) = d.capture_from_camera(PickerConfig::default()).await.unwrap()
        else {
            panic!("expected a capture");
        };
        assert_eq!(shot.len(), 1);
        assert!(path_from_uri(&shot[0].uri).exists());

        d.save_to_device_library(&shot[0]).await.unwrap();
        let saved = std::fs::read_dir(media.path()).unwrap().count();
        assert_eq!(saved, 1);
    }

    #[tokio::test]
    async fn grants_and_location_follow_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let d = device(dir.path(), dir.path());
        assert_eq!(
            d.request_permission(PermissionKind::Location).await,
            PermissionStatus::Denied
        );
        assert_eq!(
            d.request_permission(PermissionKind::PhotoLibrary).await,
            PermissionStatus::Granted
        );
        assert!(d.current_location().await.is_err());
    }
}
