//! Background execution of the composer's asynchronous operations.
//!
//! Picker, camera, location, settings, and submission flows can suspend for a
//! long time (a permission dialog, a slow disk, the post store). Each request
//! runs in its own tokio task on a clone of the composer handle, so the event
//! loop keeps rendering and accepting keystrokes. Completion is reported back
//! as `AppEvent::RequestDone`.

use threadpost_core::composer::{AttachOutcome, DraftComposer, SubmitOutcome};
use threadpost_core::error::{ComposerError, SubmitError};
use threadpost_core::types::SegmentId;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::event::AppEvent;

/// Asynchronous composer operations the keybinding dispatcher can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerRequest {
    PickFromLibrary(SegmentId),
    CaptureFromCamera(SegmentId),
    AttachLocation(SegmentId),
    Submit,
    OpenSettings,
}

/// Result of one [`ComposerRequest`], carried inside `AppEvent::RequestDone`.
#[derive(Debug)]
pub enum RequestResult {
    Attach(Result<AttachOutcome, ComposerError>),
    Submit(Result<SubmitOutcome, SubmitError>),
    Settings(Result<(), ComposerError>),
}

/// Runs `request` on a background task and reports the result on `tx`.
pub fn spawn_request(
    composer: DraftComposer,
    request: ComposerRequest,
    tx: UnboundedSender<AppEvent>,
) {
    tokio::spawn(async move {
        debug!(?request, "composer request started");
        let result = run_request(&composer, request).await;
        let _ = tx.send(AppEvent::RequestDone(Box::new(result)));
    });
}

async fn run_request(composer: &DraftComposer, request: ComposerRequest) -> RequestResult {
    match request {
        ComposerRequest::PickFromLibrary(id) => {
            RequestResult::Attach(composer.attach_from_library(id).await)
        }
        ComposerRequest::CaptureFromCamera(id) => {
            RequestResult::Attach(composer.capture_from_camera(id).await)
        }
        ComposerRequest::AttachLocation(id) => {
            RequestResult::Attach(composer.attach_location(id).await)
        }
        ComposerRequest::Submit => RequestResult::Submit(composer.submit().await),
        ComposerRequest::OpenSettings => RequestResult::Settings(composer.open_settings().await),
    }
}
