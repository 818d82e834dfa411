//! Error types for the composer and its collaborators.
//!
//! Permission denial, user cancellation, and stale segment ids are not errors:
//! they are reported through `AttachOutcome` / `SubmitOutcome`. The enums here
//! cover the genuinely unexpected cases.

use thiserror::Error;

/// Unexpected failure inside a capability provider.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The capability exists but cannot produce a value right now.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error {0}")]
    Io(#[from] std::io::Error),

    #[error("capability failed: {0}")]
    Failed(String),
}

/// Failure reported by the submission boundary.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("refusing to submit a thread with no segments")]
    EmptyThread,

    #[error("post store error {0}")]
    Storage(#[from] tokio_rusqlite::Error),

    #[error("submission rejected: {0}")]
    Rejected(String),
}

/// Unexpected failure surfaced by an asynchronous composer operation.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
}
