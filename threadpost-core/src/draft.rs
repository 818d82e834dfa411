//! In-memory draft state and the structural rules of a thread chain.
//!
//! `Draft` is plain data plus synchronous mutations. It knows nothing about
//! permissions, providers, or submission; `composer.rs` wraps it in a lock and
//! layers the asynchronous flows on top.

use tracing::debug;

use crate::types::{Attachment, Coordinate, ReplyAudience, Segment, SegmentId, MAX_ATTACHMENTS};

/// Result of merging newly acquired attachments into a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeResult {
    /// How many attachments were appended.
    pub added: usize,
    /// How many were dropped because the segment hit [`MAX_ATTACHMENTS`].
    pub discarded: usize,
}

/// The ordered chain of segments being composed.
///
/// Never empty: constructed with one blank segment, and the head segment
/// cannot be removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    segments: Vec<Segment>,
    reply_audience: ReplyAudience,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    /// A fresh draft holding a single empty segment.
    pub fn new() -> Self {
        Self {
            segments: vec![Segment::empty()],
            reply_audience: ReplyAudience::default(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    pub fn reply_audience(&self) -> ReplyAudience {
        self.reply_audience
    }

    pub fn set_reply_audience(&mut self, audience: ReplyAudience) {
        self.reply_audience = audience;
    }

    /// True when a new segment may follow the current last one.
    pub fn can_add_segment(&self) -> bool {
        self.segments.last().is_some_and(Segment::has_content)
    }

    /// True when every segment in the chain has text or attachments.
    pub fn can_submit(&self) -> bool {
        self.segments.iter().all(Segment::has_content)
    }

    /// True when nothing has been typed or attached anywhere.
    pub fn is_pristine(&self) -> bool {
        self.segments.len() == 1
            && self.segments[0].text.is_empty()
            && self.segments[0].attachments.is_empty()
            && self.segments[0].location.is_none()
    }

    /// Replaces the text of segment `id`. Returns `false` for an unknown id.
    pub fn update_text(&mut self, id: SegmentId, text: impl Into<String>) -> bool {
        match self.segment_mut(id) {
            Some(segment) => {
                segment.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Appends a blank segment when the last one has content.
    ///
    /// Returns the new id, or `None` when the chain is not eligible to grow.
    pub fn append_segment(&mut self) -> Option<SegmentId> {
        if !self.can_add_segment() {
            debug!("append refused: last segment is empty");
            return None;
        }
        let segment = Segment::empty();
        let id = segment.id;
        self.segments.push(segment);
        Some(id)
    }

    /// Removes segment `id` unless it is the head of the chain.
    pub fn remove_segment(&mut self, id: SegmentId) -> bool {
        match self.position(id) {
            Some(0) | None => false,
            Some(idx) => {
                self.segments.remove(idx);
                true
            }
        }
    }

    /// Appends `incoming` after the existing attachments of segment `id`.
    ///
    /// Existing attachments always survive; whatever does not fit under
    /// [`MAX_ATTACHMENTS`] is dropped from the tail of `incoming`.
    pub fn merge_attachments(
        &mut self,
        id: SegmentId,
        incoming: Vec<Attachment>,
    ) -> Option<MergeResult> {
        let segment = self.segment_mut(id)?;
        let total = incoming.len();
        let room = segment.remaining_capacity();
        segment.attachments.extend(incoming.into_iter().take(room));
        let added = total.min(room);
        debug_assert!(segment.attachments.len() <= MAX_ATTACHMENTS);
        Some(MergeResult { added, discarded: total - added })
    }

    /// Removes the first attachment of segment `id` whose URI equals `uri`.
    pub fn remove_attachment(&mut self, id: SegmentId, uri: &str) -> bool {
        let Some(segment) = self.segment_mut(id) else {
            return false;
        };
        match segment.attachments.iter().position(|a| a.uri == uri) {
            Some(idx) => {
                segment.attachments.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes the attachment at `index` of segment `id`.
    pub fn remove_attachment_at(&mut self, id: SegmentId, index: usize) -> bool {
        match self.segment_mut(id) {
            Some(segment) if index < segment.attachments.len() => {
                segment.attachments.remove(index);
                true
            }
            _ => false,
        }
    }

    /// Overwrites the location of segment `id`.
    pub fn set_location(&mut self, id: SegmentId, location: Coordinate) -> bool {
        match self.segment_mut(id) {
            Some(segment) => {
                segment.location = Some(location);
                true
            }
            None => false,
        }
    }

    /// Index of segment `id` in chain order.
    pub fn position(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id == id)
    }

    fn segment_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.iter_mut().find(|s| s.id == id)
    }
}
