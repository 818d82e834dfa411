//! Central application state for threadpost.
//!
//! This module owns all mutable UI state: the current mode, which segment is
//! selected, the pending permission prompt, the status line and scroll offsets.
//! The draft itself lives in the composer; `AppState` keeps an owned snapshot of
//! it that is refreshed after every mutation and on every tick. No ratatui
//! rendering logic lives here.

use threadpost_core::composer::{
    AttachOutcome, ComposerEvent, ComposerSnapshot, DraftComposer, PermissionPrompt,
    SubmitOutcome,
};
use threadpost_core::types::{PostReceipt, Segment, SegmentId, MAX_ATTACHMENTS};

use crate::worker::RequestResult;

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Segment navigation and composer commands (default).
    #[default]
    Normal,
    /// Typing into the selected segment.
    Insert,
    /// A permission was declined; the recovery prompt is shown.
    Prompt,
    /// Leaving would drop a non-empty draft.
    ConfirmDiscard,
    /// Full-screen help overlay is shown above the thread.
    HelpOverlay,
}

/// Frames of the spinner shown while composer requests are pending.
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    /// Handle shown above every segment.
    pub author: String,
    /// Last copy of the composer state.
    pub snapshot: ComposerSnapshot,
    /// Index of the selected segment in `snapshot.segments`.
    pub selected: usize,
    /// Index of the highlighted attachment within the selected segment.
    pub attachment_cursor: usize,
    /// Recovery prompt for the most recent permission denial.
    pub prompt: Option<PermissionPrompt>,
    /// One-line message for the status bar.
    pub status: Option<String>,
    /// Background composer requests not yet reported back.
    pub pending: usize,
    spinner_frame: usize,
    pub help_scroll: u16,
    /// Vertical scroll offset of the thread panel.
    pub thread_scroll: u16,
    /// Inner height of the thread panel, cached after each render.
    pub thread_viewport_height: u16,
    /// Receipt of the thread this session posted, if any.
    pub last_receipt: Option<PostReceipt>,
}

impl AppState {
    pub fn new(author: impl Into<String>, snapshot: ComposerSnapshot) -> Self {
        Self {
            mode: Mode::default(),
            author: author.into(),
            snapshot,
            selected: 0,
            attachment_cursor: 0,
            prompt: None,
            status: None,
            pending: 0,
            spinner_frame: 0,
            help_scroll: 0,
            thread_scroll: 0,
            thread_viewport_height: 0,
            last_receipt: None,
        }
    }

    /// Re-reads the composer state and keeps the selection in range.
    pub fn refresh(&mut self, composer: &DraftComposer) {
        self.snapshot = composer.snapshot();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let last = self.snapshot.segments.len().saturating_sub(1);
        self.selected = self.selected.min(last);
        let attachments = self.selected_segment().map_or(0, |s| s.attachments.len());
        self.attachment_cursor = self.attachment_cursor.min(attachments.saturating_sub(1));
    }

    pub fn selected_segment(&self) -> Option<&Segment> {
        self.snapshot.segments.get(self.selected)
    }

    pub fn selected_id(&self) -> Option<SegmentId> {
        self.selected_segment().map(|s| s.id)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.snapshot.segments.len() {
            self.select(self.selected + 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.select(self.selected.saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.select(0);
    }

    pub fn select_last(&mut self) {
        self.select(self.snapshot.segments.len().saturating_sub(1));
    }

    /// Selects the segment with `id` if it is present.
    pub fn select_id(&mut self, id: SegmentId) {
        if let Some(idx) = self.snapshot.segments.iter().position(|s| s.id == id) {
            self.select(idx);
        }
    }

    fn select(&mut self, idx: usize) {
        if idx != self.selected {
            self.attachment_cursor = 0;
        }
        self.selected = idx;
        self.clamp_selection();
    }

    /// Position of the highlighted attachment, if the selected segment has any.
    pub fn selected_attachment(&self) -> Option<usize> {
        let len = self.selected_segment()?.attachments.len();
        (self.attachment_cursor < len).then_some(self.attachment_cursor)
    }

    pub fn next_attachment(&mut self) {
        let len = self.selected_segment().map_or(0, |s| s.attachments.len());
        if self.attachment_cursor + 1 < len {
            self.attachment_cursor += 1;
        }
    }

    pub fn prev_attachment(&mut self) {
        self.attachment_cursor = self.attachment_cursor.saturating_sub(1);
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Spinner glyph while requests are pending.
    pub fn spinner(&self) -> Option<&'static str> {
        (self.pending > 0).then(|| SPINNER[self.spinner_frame % SPINNER.len()])
    }

    /// Advances per-tick animation.
    pub fn on_tick(&mut self) {
        if self.pending > 0 {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    /// Marks one more background request as in flight.
    pub fn request_started(&mut self) {
        self.pending += 1;
    }

    /// Applies a notification published by the composer.
    pub fn apply_composer_event(&mut self, event: ComposerEvent) {
        match event {
            ComposerEvent::PermissionDenied(prompt) => self.show_prompt(prompt),
            ComposerEvent::AttachmentsClamped { discarded, .. } => {
                self.set_status(clamp_message(discarded));
            }
            ComposerEvent::Posted(receipt) => {
                self.set_status(posted_message(&receipt));
                self.last_receipt = Some(receipt);
            }
            ComposerEvent::SubmitFailed(reason) => {
                self.set_status(format!("Post failed: {reason}. Your draft was kept."));
            }
        }
    }

    /// Applies the result of a finished background request.
    pub fn apply_request_result(&mut self, result: RequestResult) {
        self.pending = self.pending.saturating_sub(1);
        match result {
            RequestResult::Attach(Ok(AttachOutcome::Denied(prompt))) => self.show_prompt(prompt),
            RequestResult::Attach(Ok(outcome)) => {
                if let Some(message) = attach_message(&outcome) {
                    self.set_status(message);
                }
            }
            RequestResult::Attach(Err(e)) => self.set_status(e.to_string()),
            RequestResult::Submit(Ok(SubmitOutcome::Posted(receipt))) => {
                self.set_status(posted_message(&receipt));
                self.last_receipt = Some(receipt);
            }
            RequestResult::Submit(Ok(SubmitOutcome::NotReady)) => {
                self.set_status("Every post in the thread needs text or media");
            }
            RequestResult::Submit(Ok(SubmitOutcome::InFlight)) => {
                self.set_status("Already posting");
            }
            // Reported through ComposerEvent::SubmitFailed.
            RequestResult::Submit(Err(_)) => {}
            RequestResult::Settings(Ok(())) => {
                self.set_status("Edit [permissions] in the config file, then restart");
            }
            RequestResult::Settings(Err(e)) => self.set_status(e.to_string()),
        }
    }

    /// Closes the permission prompt and returns to Normal mode.
    pub fn close_prompt(&mut self) {
        self.prompt = None;
        if self.mode == Mode::Prompt {
            self.mode = Mode::Normal;
        }
    }

    fn show_prompt(&mut self, prompt: PermissionPrompt) {
        self.prompt = Some(prompt);
        if matches!(self.mode, Mode::Normal | Mode::Prompt) {
            self.mode = Mode::Prompt;
        }
    }
}

/// Status text for a finished acquisition, or `None` when nothing is worth
/// reporting.
pub fn attach_message(outcome: &AttachOutcome) -> Option<String> {
    match outcome {
        AttachOutcome::Attached { discarded, .. } if *discarded > 0 => {
            Some(clamp_message(*discarded))
        }
        AttachOutcome::Attached { added, .. } => Some(match added {
            1 => "Attached 1 item".to_owned(),
            n => format!("Attached {n} items"),
        }),
        AttachOutcome::Located(coordinate) => Some(format!("Location set to {coordinate}")),
        AttachOutcome::Busy => Some("Posting in progress; try again afterwards".to_owned()),
        AttachOutcome::Cancelled | AttachOutcome::UnknownSegment | AttachOutcome::Denied(_) => {
            None
        }
    }
}

pub fn clamp_message(discarded: usize) -> String {
    format!("Up to {MAX_ATTACHMENTS} attachments per post; {discarded} not added")
}

pub fn posted_message(receipt: &PostReceipt) -> String {
    let n = receipt.post_ids.len();
    let noun = if n == 1 { "post" } else { "posts" };
    format!("Posted thread {} ({n} {noun})", receipt.thread_id)
}
