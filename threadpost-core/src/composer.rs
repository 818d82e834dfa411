//! The "new thread" composer.
//!
//! `DraftComposer` owns the draft behind a single mutex and runs every
//! acquisition flow as a plain async function: request the permission, invoke
//! the provider, then re-lock and merge into the target segment. The lock is
//! never held across an `.await`, so editing one segment is never blocked by a
//! pending picker on another.
//!
//! Each flow resolves its target by id *after* the provider returns. If the
//! segment was removed in the meantime the merge is a silent no-op.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::capability::{Capabilities, PermissionKind, PickOutcome, PickerConfig};
use crate::draft::Draft;
use crate::error::{ComposerError, SubmitError};
use crate::sink::PostSink;
use crate::types::{
    Attachment, Coordinate, PostReceipt, ReplyAudience, Segment, SegmentId, Session,
    ThreadSubmission,
};

/// Recoverable prompt shown when a permission request is declined.
///
/// The UI offers two choices: open system settings (see
/// [`DraftComposer::open_settings`]) or dismiss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    pub kind: PermissionKind,
    pub title: String,
    pub message: String,
}

impl PermissionPrompt {
    pub fn for_kind(kind: PermissionKind) -> Self {
        let title = match kind {
            PermissionKind::Camera => "Camera permission not granted",
            PermissionKind::PhotoLibrary => "Photos permission not granted",
            PermissionKind::Location => "Location permission not granted",
            PermissionKind::MediaSave => "Media library permission not granted",
        };
        Self {
            kind,
            title: title.to_owned(),
            message: format!("Please grant {} permission to use this feature", kind.noun()),
        }
    }
}

/// How an acquisition flow ended.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachOutcome {
    /// Media merged into the segment; `discarded` counts items past the cap.
    Attached { added: usize, discarded: usize },
    /// The segment's location was overwritten.
    Located(Coordinate),
    /// The user backed out of the picker or camera.
    Cancelled,
    /// Permission declined; nothing changed.
    Denied(PermissionPrompt),
    /// The target segment no longer exists.
    UnknownSegment,
    /// Refused because a submission is in flight.
    Busy,
}

/// How a call to [`DraftComposer::submit`] ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Accepted by the submission boundary; the draft was reset.
    Posted(PostReceipt),
    /// Some segment is blank; nothing was sent.
    NotReady,
    /// Another submission is already in flight; nothing was sent.
    InFlight,
}

/// Notifications for the hosting UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ComposerEvent {
    PermissionDenied(PermissionPrompt),
    AttachmentsClamped { segment: SegmentId, discarded: usize },
    Posted(PostReceipt),
    SubmitFailed(String),
}

/// Owned copy of the composer state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposerSnapshot {
    pub segments: Vec<Segment>,
    pub reply_audience: ReplyAudience,
    pub is_submitting: bool,
    pub can_add_segment: bool,
    pub can_submit: bool,
}

#[derive(Debug, Default)]
struct ComposerState {
    draft: Draft,
    is_submitting: bool,
}

/// Handle to one open composer session.
///
/// Cloning is cheap and every clone shares the same draft, which lets the UI
/// hand a clone to a background task for each pending acquisition.
#[derive(Clone)]
pub struct DraftComposer {
    state: Arc<Mutex<ComposerState>>,
    capabilities: Capabilities,
    sink: Arc<dyn PostSink>,
    session: Session,
    events: Option<UnboundedSender<ComposerEvent>>,
}

impl DraftComposer {
    /// Opens a composer with a single empty segment.
    pub fn new(capabilities: Capabilities, sink: Arc<dyn PostSink>, session: Session) -> Self {
        Self {
            state: Arc::new(Mutex::new(ComposerState::default())),
            capabilities,
            sink,
            session,
            events: None,
        }
    }

    /// Publishes [`ComposerEvent`]s on `tx` in addition to returning outcomes.
    pub fn with_events(mut self, tx: UnboundedSender<ComposerEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn snapshot(&self) -> ComposerSnapshot {
        let state = self.lock();
        ComposerSnapshot {
            segments: state.draft.segments().to_vec(),
            reply_audience: state.draft.reply_audience(),
            is_submitting: state.is_submitting,
            can_add_segment: state.draft.can_add_segment(),
            can_submit: state.draft.can_submit(),
        }
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.lock().draft.segments().to_vec()
    }

    pub fn segment(&self, id: SegmentId) -> Option<Segment> {
        self.lock().draft.segment(id).cloned()
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().is_submitting
    }

    pub fn can_add_segment(&self) -> bool {
        self.lock().draft.can_add_segment()
    }

    pub fn can_submit(&self) -> bool {
        self.lock().draft.can_submit()
    }

    /// True when the draft holds nothing worth confirming before a discard.
    pub fn is_pristine(&self) -> bool {
        self.lock().draft.is_pristine()
    }

    // Draft mutations are refused while a submission is in flight; the draft
    // is replaced once the post lands.

    /// Replaces the text of segment `id`.
    ///
    /// Returns `false` for an unknown id or while submitting.
    pub fn update_text(&self, id: SegmentId, text: impl Into<String>) -> bool {
        let Some(mut state) = self.editable("update_text") else {
            return false;
        };
        let updated = state.draft.update_text(id, text);
        if !updated {
            debug!(%id, "update_text on unknown segment ignored");
        }
        updated
    }

    pub fn append_segment(&self) -> Option<SegmentId> {
        let appended = self.editable("append_segment")?.draft.append_segment();
        if let Some(id) = appended {
            debug!(%id, "segment appended");
        }
        appended
    }

    pub fn remove_segment(&self, id: SegmentId) -> bool {
        let Some(mut state) = self.editable("remove_segment") else {
            return false;
        };
        let removed = state.draft.remove_segment(id);
        if removed {
            debug!(%id, "segment removed");
        }
        removed
    }

    /// Removes the first attachment with `uri` from segment `id`.
    pub fn remove_attachment(&self, id: SegmentId, uri: &str) -> bool {
        let Some(mut state) = self.editable("remove_attachment") else {
            return false;
        };
        state.draft.remove_attachment(id, uri)
    }

    /// Removes the attachment at `index` from segment `id`.
    ///
    /// Unlike [`remove_attachment`](Self::remove_attachment) this targets one
    /// exact entry even when the same URI was attached twice.
    pub fn remove_attachment_at(&self, id: SegmentId, index: usize) -> bool {
        let Some(mut state) = self.editable("remove_attachment_at") else {
            return false;
        };
        state.draft.remove_attachment_at(id, index)
    }

    pub fn set_reply_audience(&self, audience: ReplyAudience) -> bool {
        let Some(mut state) = self.editable("set_reply_audience") else {
            return false;
        };
        state.draft.set_reply_audience(audience);
        true
    }

    /// Advances the reply audience to the next option and returns it.
    ///
    /// `None` while submitting.
    pub fn cycle_reply_audience(&self) -> Option<ReplyAudience> {
        let mut state = self.editable("cycle_reply_audience")?;
        let next = state.draft.reply_audience().next();
        state.draft.set_reply_audience(next);
        Some(next)
    }

    /// Picks images or videos from the photo library into segment `id`.
    pub async fn attach_from_library(&self, id: SegmentId) -> Result<AttachOutcome, ComposerError> {
        if let Some(early) = self.check_media_target(id) {
            return Ok(early);
        }
        if let Some(prompt) = self.ensure_permission(PermissionKind::PhotoLibrary).await {
            return Ok(AttachOutcome::Denied(prompt));
        }

        let picked = self.capabilities.media.pick_from_library(PickerConfig::default()).await?;
        match picked {
            PickOutcome::Cancelled => {
                debug!(%id, "library picker cancelled");
                Ok(AttachOutcome::Cancelled)
            }
            PickOutcome::Picked(items) => Ok(self.merge(id, items)),
        }
    }

    /// Captures with the camera into segment `id`.
    ///
    /// After the capture is merged, the first captured resource is copied into
    /// the device gallery when the media-save permission is granted. Neither a
    /// denied save permission nor a failed save affects the attach result.
    pub async fn capture_from_camera(&self, id: SegmentId) -> Result<AttachOutcome, ComposerError> {
        if let Some(early) = self.check_media_target(id) {
            return Ok(early);
        }
        if let Some(prompt) = self.ensure_permission(PermissionKind::Camera).await {
            return Ok(AttachOutcome::Denied(prompt));
        }

        let captured = self.capabilities.media.capture_from_camera(PickerConfig::default()).await?;
        let items = match captured {
            PickOutcome::Cancelled => {
                debug!(%id, "camera cancelled");
                return Ok(AttachOutcome::Cancelled);
            }
            PickOutcome::Picked(items) => items,
        };

        let first = items.first().cloned();
        let outcome = self.merge(id, items);
        if let Some(first) = first {
            self.save_to_gallery(&first).await;
        }
        Ok(outcome)
    }

    /// Fetches the current position once and stores it on segment `id`.
    pub async fn attach_location(&self, id: SegmentId) -> Result<AttachOutcome, ComposerError> {
        if let Some(early) = self.check_media_target(id) {
            return Ok(early);
        }
        if let Some(prompt) = self.ensure_permission(PermissionKind::Location).await {
            return Ok(AttachOutcome::Denied(prompt));
        }

        let coordinate = self.capabilities.location.current_location().await?;
        let Some(mut state) = self.editable("attach_location") else {
            return Ok(AttachOutcome::Busy);
        };
        if state.draft.set_location(id, coordinate) {
            debug!(%id, %coordinate, "location attached");
            Ok(AttachOutcome::Located(coordinate))
        } else {
            debug!(%id, "segment removed while locating");
            Ok(AttachOutcome::UnknownSegment)
        }
    }

    /// Sends the draft to the submission boundary.
    ///
    /// On success the draft is reset and the composer dismissed. On failure the
    /// draft is left as it was so the user can retry. `is_submitting` is
    /// cleared either way.
    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        let submission = match self.begin_submission() {
            Ok(submission) => submission,
            Err(outcome) => return Ok(outcome),
        };

        let result = self.sink.submit_post(&self.session, &submission).await;
        match result {
            Ok(receipt) => {
                {
                    let mut state = self.lock();
                    state.draft = Draft::new();
                    state.is_submitting = false;
                }
                info!(
                    thread_id = %receipt.thread_id,
                    posts = receipt.post_ids.len(),
                    "thread posted"
                );
                self.emit(ComposerEvent::Posted(receipt.clone()));
                self.capabilities.navigator.dismiss();
                Ok(SubmitOutcome::Posted(receipt))
            }
            Err(err) => {
                self.lock().is_submitting = false;
                warn!(error = %err, "thread submission failed; draft kept");
                self.emit(ComposerEvent::SubmitFailed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Hands off to system settings from a permission prompt.
    pub async fn open_settings(&self) -> Result<(), ComposerError> {
        self.capabilities.settings.open_system_settings().await?;
        Ok(())
    }

    /// Drops the draft and dismisses the composer.
    ///
    /// Returns `false` (and does nothing) while a submission is in flight.
    pub fn discard(&self) -> bool {
        {
            let mut state = self.lock();
            if state.is_submitting {
                return false;
            }
            state.draft = Draft::new();
        }
        debug!("draft discarded");
        self.capabilities.navigator.dismiss();
        true
    }

    fn lock(&self) -> MutexGuard<'_, ComposerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The locked state, or `None` while a submission is in flight.
    fn editable(&self, op: &'static str) -> Option<MutexGuard<'_, ComposerState>> {
        let state = self.lock();
        if state.is_submitting {
            debug!(op, "refused while submitting");
            return None;
        }
        Some(state)
    }

    fn emit(&self, event: ComposerEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    /// Early exit for acquisition flows: busy composer or stale id.
    fn check_media_target(&self, id: SegmentId) -> Option<AttachOutcome> {
        let state = self.lock();
        if state.is_submitting {
            Some(AttachOutcome::Busy)
        } else if state.draft.segment(id).is_none() {
            Some(AttachOutcome::UnknownSegment)
        } else {
            None
        }
    }

    /// Requests `kind`; on denial publishes and returns the recovery prompt.
    async fn ensure_permission(&self, kind: PermissionKind) -> Option<PermissionPrompt> {
        let status = self.capabilities.permissions.request_permission(kind).await;
        if status.is_granted() {
            return None;
        }
        debug!(?kind, "permission denied");
        let prompt = PermissionPrompt::for_kind(kind);
        self.emit(ComposerEvent::PermissionDenied(prompt.clone()));
        Some(prompt)
    }

    fn merge(&self, id: SegmentId, items: Vec<Attachment>) -> AttachOutcome {
        let Some(mut state) = self.editable("merge") else {
            return AttachOutcome::Busy;
        };
        let merged = state.draft.merge_attachments(id, items);
        drop(state);
        let Some(result) = merged else {
            debug!(%id, "segment removed while acquiring media");
            return AttachOutcome::UnknownSegment;
        };
        if result.discarded > 0 {
            warn!(%id, discarded = result.discarded, "attachment cap reached; extra items dropped");
            self.emit(ComposerEvent::AttachmentsClamped { segment: id, discarded: result.discarded });
        }
        AttachOutcome::Attached { added: result.added, discarded: result.discarded }
    }

    async fn save_to_gallery(&self, attachment: &Attachment) {
        let status = self
            .capabilities
            .permissions
            .request_permission(PermissionKind::MediaSave)
            .await;
        if !status.is_granted() {
            debug!("media save permission denied; capture not copied to gallery");
            return;
        }
        if let Err(err) = self.capabilities.media.save_to_device_library(attachment).await {
            warn!(uri = %attachment.uri, error = %err, "saving capture to gallery failed");
        }
    }

    fn begin_submission(&self) -> Result<ThreadSubmission, SubmitOutcome> {
        let mut state = self.lock();
        if state.is_submitting {
            debug!("submit ignored: already in flight");
            return Err(SubmitOutcome::InFlight);
        }
        if !state.draft.can_submit() {
            debug!("submit ignored: draft has an empty segment");
            return Err(SubmitOutcome::NotReady);
        }
        state.is_submitting = true;
        Ok(ThreadSubmission {
            segments: state.draft.segments().to_vec(),
            reply_audience: state.draft.reply_audience(),
        })
    }
}
