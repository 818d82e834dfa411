use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of attachments a single segment may carry.
pub const MAX_ATTACHMENTS: usize = 5;

/// Opaque identifier of a draft segment.
///
/// Generated once when the segment is created and never reassigned. Removing a
/// segment retires its id for good; a later append always gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentId(Uuid);

impl SegmentId {
    /// Generates a new random (UUID v4) segment id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where an attachment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentSource {
    /// Picked from the photo library.
    Library,
    /// Captured with the camera.
    Camera,
}

impl AttachmentSource {
    /// Column value used by the post store.
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentSource::Library => "library",
            AttachmentSource::Camera => "camera",
        }
    }

    /// Parses the post store column value.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "library" => Some(AttachmentSource::Library),
            "camera" => Some(AttachmentSource::Camera),
            _ => None,
        }
    }
}

/// A reference to a locally addressable image or video.
///
/// The composer never looks inside the resource; two attachments are the same
/// attachment when their URIs are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub uri: String,
    pub source: AttachmentSource,
}

impl Attachment {
    pub fn library(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), source: AttachmentSource::Library }
    }

    pub fn camera(uri: impl Into<String>) -> Self {
        Self { uri: uri.into(), source: AttachmentSource::Camera }
    }
}

/// A single geographic reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// One link of the thread chain being composed.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub text: String,
    /// At most [`MAX_ATTACHMENTS`] entries, in the order they were attached.
    pub attachments: Vec<Attachment>,
    /// Last location fetched for this segment, if any.
    pub location: Option<Coordinate>,
}

impl Segment {
    /// Creates an empty segment with a fresh id.
    pub fn empty() -> Self {
        Self {
            id: SegmentId::new(),
            text: String::new(),
            attachments: Vec::new(),
            location: None,
        }
    }

    /// True when the segment has visible text or at least one attachment.
    ///
    /// Whitespace-only text does not count.
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty() || !self.attachments.is_empty()
    }

    /// Number of attachments that can still be added before hitting the cap.
    pub fn remaining_capacity(&self) -> usize {
        MAX_ATTACHMENTS.saturating_sub(self.attachments.len())
    }
}

/// Who may reply to and quote the posted thread.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyAudience {
    #[default]
    Anyone,
    ProfilesYouFollow,
    MentionedOnly,
}

impl ReplyAudience {
    /// Returns the next option in footer order (wraps around).
    pub fn next(self) -> Self {
        match self {
            ReplyAudience::Anyone => ReplyAudience::ProfilesYouFollow,
            ReplyAudience::ProfilesYouFollow => ReplyAudience::MentionedOnly,
            ReplyAudience::MentionedOnly => ReplyAudience::Anyone,
        }
    }

    /// Human-readable label shown in the composer footer.
    pub fn label(self) -> &'static str {
        match self {
            ReplyAudience::Anyone => "Anyone",
            ReplyAudience::ProfilesYouFollow => "Profiles you follow",
            ReplyAudience::MentionedOnly => "Mentioned only",
        }
    }

    /// Column value used by the post store.
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyAudience::Anyone => "anyone",
            ReplyAudience::ProfilesYouFollow => "following",
            ReplyAudience::MentionedOnly => "mentioned",
        }
    }

    /// Parses the post store column value.
    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "anyone" => Some(ReplyAudience::Anyone),
            "following" => Some(ReplyAudience::ProfilesYouFollow),
            "mentioned" => Some(ReplyAudience::MentionedOnly),
            _ => None,
        }
    }
}

/// Author context handed to the submission boundary.
///
/// Passed explicitly rather than read from global login state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub author: String,
}

impl Session {
    pub fn new(author: impl Into<String>) -> Self {
        Self { author: author.into() }
    }
}

/// Everything the submission boundary receives for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSubmission {
    /// Segments in chain order; index 0 is the head post.
    pub segments: Vec<Segment>,
    pub reply_audience: ReplyAudience,
}

/// Acknowledgement returned by the submission boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub thread_id: String,    // UUID v4 text
    pub post_ids: Vec<String>,
    pub created_at: i64,      // Unix timestamp seconds
}

/// A thread as read back from the post store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredThread {
    pub id: String,
    pub author: String,
    pub reply_audience: ReplyAudience,
    pub created_at: i64,
    pub posts: Vec<StoredPost>,
}

/// One post of a stored thread.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPost {
    pub id: String,
    pub position: i64,
    pub text: String,
    pub location: Option<Coordinate>,
    pub attachments: Vec<Attachment>,
}
