use async_trait::async_trait;

use crate::error::SubmitError;
use crate::types::{PostReceipt, Session, ThreadSubmission};

/// The submission boundary: whatever accepts a finished thread.
///
/// The composer hands over the segments in chain order and does not care how
/// they are transported or stored. [`crate::db::PostStore`] is the local
/// SQLite implementation.
#[async_trait]
pub trait PostSink: Send + Sync {
    async fn submit_post(
        &self,
        session: &Session,
        thread: &ThreadSubmission,
    ) -> Result<PostReceipt, SubmitError>;
}
