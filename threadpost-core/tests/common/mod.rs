//! Scripted fakes for the composer's collaborators.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use threadpost_core::capability::{
    Capabilities, LocationProvider, MediaProvider, Navigator, PermissionKind, PermissionProvider,
    PermissionStatus, PickOutcome, PickerConfig, SettingsProvider,
};
use threadpost_core::composer::DraftComposer;
use threadpost_core::error::{CapabilityError, SubmitError};
use threadpost_core::sink::PostSink;
use threadpost_core::types::{
    Attachment, Coordinate, PostReceipt, Session, ThreadSubmission,
};

/// A device whose every answer is queued up front by the test.
#[derive(Default)]
pub struct FakeDevice {
    pub denied: Mutex<HashMap<PermissionKind, bool>>,
    pub requested: Mutex<Vec<PermissionKind>>,
    pub library: Mutex<VecDeque<PickOutcome>>,
    pub camera: Mutex<VecDeque<PickOutcome>>,
    pub picker_configs: Mutex<Vec<PickerConfig>>,
    pub locations: Mutex<VecDeque<Coordinate>>,
    pub saved: Mutex<Vec<String>>,
    pub fail_save: AtomicBool,
    pub settings_opened: AtomicUsize,
    pub dismissed: AtomicUsize,
    /// When set, the library picker waits for `release` before answering.
    pub hold_library: AtomicBool,
    pub release: Notify,
}

impl FakeDevice {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn deny(&self, kind: PermissionKind) {
        self.denied.lock().unwrap().insert(kind, true);
    }

    pub fn queue_library(&self, outcome: PickOutcome) {
        self.library.lock().unwrap().push_back(outcome);
    }

    pub fn queue_camera(&self, outcome: PickOutcome) {
        self.camera.lock().unwrap().push_back(outcome);
    }

    pub fn queue_location(&self, latitude: f64, longitude: f64) {
        self.locations.lock().unwrap().push_back(Coordinate { latitude, longitude });
    }

    pub fn requested(&self) -> Vec<PermissionKind> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PermissionProvider for FakeDevice {
    async fn request_permission(&self, kind: PermissionKind) -> PermissionStatus {
        self.requested.lock().unwrap().push(kind);
        if self.denied.lock().unwrap().get(&kind).copied().unwrap_or(false) {
            PermissionStatus::Denied
        } else {
            PermissionStatus::Granted
        }
    }
}

#[async_trait]
impl MediaProvider for FakeDevice {
    async fn pick_from_library(&self, config: PickerConfig) -> Result<PickOutcome, CapabilityError> {
        self.picker_configs.lock().unwrap().push(config);
        if self.hold_library.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        Ok(self.library.lock().unwrap().pop_front().unwrap_or(PickOutcome::Cancelled))
    }

    async fn capture_from_camera(
        &self,
        config: PickerConfig,
    ) -> Result<PickOutcome, CapabilityError> {
        self.picker_configs.lock().unwrap().push(config);
        Ok(self.camera.lock().unwrap().pop_front().unwrap_or(PickOutcome::Cancelled))
    }

    async fn save_to_device_library(&self, attachment: &Attachment) -> Result<(), CapabilityError> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(CapabilityError::Failed("gallery is read-only".into()));
        }
        self.saved.lock().unwrap().push(attachment.uri.clone());
        Ok(())
    }
}

#[async_trait]
impl LocationProvider for FakeDevice {
    async fn current_location(&self) -> Result<Coordinate, CapabilityError> {
        self.locations
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CapabilityError::Unavailable("no fix".into()))
    }
}

#[async_trait]
impl SettingsProvider for FakeDevice {
    async fn open_system_settings(&self) -> Result<(), CapabilityError> {
        self.settings_opened.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Navigator for FakeDevice {
    fn dismiss(&self) {
        self.dismissed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Submission boundary that records what it receives.
#[derive(Default)]
pub struct FakeSink {
    pub received: Mutex<Vec<ThreadSubmission>>,
    pub failures: Mutex<VecDeque<String>>,
    /// When set, submissions wait for `release` before answering.
    pub hold: AtomicBool,
    pub release: Notify,
}

impl FakeSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, reason: &str) {
        self.failures.lock().unwrap().push_back(reason.to_owned());
    }

    pub fn received(&self) -> Vec<ThreadSubmission> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostSink for FakeSink {
    async fn submit_post(
        &self,
        _session: &Session,
        thread: &ThreadSubmission,
    ) -> Result<PostReceipt, SubmitError> {
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        self.received.lock().unwrap().push(thread.clone());
        if let Some(reason) = self.failures.lock().unwrap().pop_front() {
            return Err(SubmitError::Rejected(reason));
        }
        Ok(PostReceipt {
            thread_id: "thread-1".into(),
            post_ids: (0..thread.segments.len()).map(|i| format!("post-{i}")).collect(),
            created_at: 0,
        })
    }
}

pub fn composer(device: &Arc<FakeDevice>, sink: &Arc<FakeSink>) -> DraftComposer {
    DraftComposer::new(
        Capabilities::from_device(device.clone()),
        sink.clone(),
        Session::new("zerohch0"),
    )
}

pub fn photos(prefix: &str, n: usize) -> Vec<Attachment> {
    (0..n).map(|i| Attachment::library(format!("file:///{prefix}-{i}.jpg"))).collect()
}
