//! Boundary traits for the device capabilities the composer depends on.
//!
//! Each trait is one external collaborator: permission grants, media
//! acquisition, geolocation, the system settings hand-off, and navigation.
//! Implementations live outside the core (the `threadpost` binary provides
//! desktop versions; the integration tests provide scripted fakes).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CapabilityError;
use crate::types::{Attachment, Coordinate, MAX_ATTACHMENTS};

/// A capability gated behind a user permission grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Camera,
    PhotoLibrary,
    /// Foreground location only; the composer never tracks in the background.
    Location,
    /// Writing captured media into the device gallery.
    MediaSave,
}

impl PermissionKind {
    /// Short user-facing noun used in permission prompts.
    pub fn noun(self) -> &'static str {
        match self {
            PermissionKind::Camera => "camera",
            PermissionKind::PhotoLibrary => "photos",
            PermissionKind::Location => "location",
            PermissionKind::MediaSave => "media library",
        }
    }
}

/// Answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Options passed to the library picker and the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickerConfig {
    pub multi_select: bool,
    /// Ceiling enforced by the acquisition UI itself, independent of how many
    /// attachments the target segment already holds.
    pub max_count: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self { multi_select: true, max_count: MAX_ATTACHMENTS }
    }
}

/// Result of a picker or camera session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// The user backed out without choosing anything.
    Cancelled,
    /// Selected resources in selection order.
    Picked(Vec<Attachment>),
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    async fn request_permission(&self, kind: PermissionKind) -> PermissionStatus;
}

#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn pick_from_library(&self, config: PickerConfig) -> Result<PickOutcome, CapabilityError>;

    async fn capture_from_camera(&self, config: PickerConfig)
        -> Result<PickOutcome, CapabilityError>;

    /// Best-effort copy of `attachment` into the device gallery.
    async fn save_to_device_library(&self, attachment: &Attachment) -> Result<(), CapabilityError>;
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// One-shot reading of the current position.
    async fn current_location(&self) -> Result<Coordinate, CapabilityError>;
}

#[async_trait]
pub trait SettingsProvider: Send + Sync {
    async fn open_system_settings(&self) -> Result<(), CapabilityError>;
}

/// The navigation layer hosting the composer.
pub trait Navigator: Send + Sync {
    /// Closes the composer screen.
    fn dismiss(&self);
}

/// The full set of collaborators one composer talks to.
///
/// A single device type usually implements every trait; [`Capabilities::from_device`]
/// wires it into each slot.
#[derive(Clone)]
pub struct Capabilities {
    pub permissions: Arc<dyn PermissionProvider>,
    pub media: Arc<dyn MediaProvider>,
    pub location: Arc<dyn LocationProvider>,
    pub settings: Arc<dyn SettingsProvider>,
    pub navigator: Arc<dyn Navigator>,
}

impl Capabilities {
    pub fn from_device<D>(device: Arc<D>) -> Self
    where
        D: PermissionProvider
            + MediaProvider
            + LocationProvider
            + SettingsProvider
            + Navigator
            + 'static,
    {
        Self {
            permissions: device.clone(),
            media: device.clone(),
            location: device.clone(),
            settings: device.clone(),
            navigator: device,
        }
    }
}
