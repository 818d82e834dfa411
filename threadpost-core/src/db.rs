use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::error::SubmitError;
use crate::sink::PostSink;
use crate::types::{
    Attachment, AttachmentSource, Coordinate, PostReceipt, ReplyAudience, Session, StoredPost,
    StoredThread, ThreadSubmission,
};

/// Opens (or creates) the SQLite database at `path`, configures WAL mode,
/// and applies schema migrations via the `schema_version` table.
///
/// `busy_timeout` is set via the `Connection` method rather than a PRAGMA
/// string so the setting takes effect regardless of pragma caching.
///
/// # Errors
///
/// Returns `tokio_rusqlite::Error` if the file cannot be opened, WAL configuration
/// fails, or schema DDL fails.
pub async fn open_db(path: &str) -> Result<Connection, tokio_rusqlite::Error> {
    let conn = Connection::open(path).await?;

    conn.call(|db| {
        db.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;",
        )?;
        db.busy_timeout(Duration::from_secs(5))?;
        crate::schema::migrate(db)?;
        Ok(())
    })
    .await?;

    Ok(conn)
}

/// Returns the current Unix timestamp in seconds.
fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Local submission boundary backed by SQLite.
///
/// Stands in for the remote backend: every accepted thread becomes one row in
/// `threads`, one row per segment in `posts`, and one row per media reference
/// in `post_attachments`.
#[derive(Clone)]
pub struct PostStore {
    conn: Connection,
}

impl PostStore {
    /// Opens the store at `path`, creating and migrating it as needed.
    pub async fn open(path: &str) -> Result<Self, tokio_rusqlite::Error> {
        Ok(Self { conn: open_db(path).await? })
    }

    /// Writes `thread` in a single `BEGIN IMMEDIATE` transaction.
    ///
    /// Post ids are fresh UUID v4 values; segment ids are composer-local and
    /// are not persisted.
    ///
    /// # Errors
    ///
    /// Returns `tokio_rusqlite::Error` if any insert fails; nothing is written then.
    pub async fn insert_thread(
        &self,
        session: &Session,
        thread: &ThreadSubmission,
    ) -> Result<PostReceipt, tokio_rusqlite::Error> {
        let author = session.author.clone();
        let thread = thread.clone();

        self.conn
            .call(move |db| {
                let thread_id = uuid::Uuid::new_v4().to_string();
                let now = now_secs();
                let mut post_ids = Vec::with_capacity(thread.segments.len());

                let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
                tx.execute(
                    "INSERT INTO threads (id, author, reply_audience, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    rusqlite::params![&thread_id, &author, thread.reply_audience.as_str(), now],
                )?;
                for (position, segment) in thread.segments.iter().enumerate() {
                    let post_id = uuid::Uuid::new_v4().to_string();
                    tx.execute(
                        "INSERT INTO posts (id, thread_id, position, text, latitude, longitude)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                        rusqlite::params![
                            &post_id,
                            &thread_id,
                            position as i64,
                            &segment.text,
                            segment.location.map(|c| c.latitude),
                            segment.location.map(|c| c.longitude),
                        ],
                    )?;
                    for (slot, attachment) in segment.attachments.iter().enumerate() {
                        tx.execute(
                            "INSERT INTO post_attachments (post_id, position, uri, source)
                             VALUES (?1, ?2, ?3, ?4)",
                            rusqlite::params![
                                &post_id,
                                slot as i64,
                                &attachment.uri,
                                attachment.source.as_str(),
                            ],
                        )?;
                    }
                    post_ids.push(post_id);
                }
                tx.commit()?;

                Ok(PostReceipt { thread_id, post_ids, created_at: now })
            })
            .await
    }

    /// Reads a stored thread back with its posts and attachments in order.
    ///
    /// Returns `None` when no thread has that id.
    ///
    /// # Errors
    ///
    /// Returns `tokio_rusqlite::Error` if a query fails.
    pub async fn load_thread(
        &self,
        thread_id: &str,
    ) -> Result<Option<StoredThread>, tokio_rusqlite::Error> {
        let thread_id = thread_id.to_owned();

        self.conn
            .call(move |db| {
                let header = db
                    .query_row(
                        "SELECT author, reply_audience, created_at FROM threads WHERE id = ?1",
                        rusqlite::params![&thread_id],
                        |r| {
                            let author: String = r.get(0)?;
                            let audience: String = r.get(1)?;
                            let created_at: i64 = r.get(2)?;
                            Ok((author, audience, created_at))
                        },
                    )
                    .optional()?;
                let Some((author, audience, created_at)) = header else {
                    return Ok(None);
                };

                let mut post_stmt = db.prepare(
                    "SELECT id, position, text, latitude, longitude
                     FROM posts WHERE thread_id = ?1 ORDER BY position",
                )?;
                let mut posts = post_stmt
                    .query_map(rusqlite::params![&thread_id], |r| {
                        let latitude: Option<f64> = r.get(3)?;
                        let longitude: Option<f64> = r.get(4)?;
                        Ok(StoredPost {
                            id: r.get(0)?,
                            position: r.get(1)?,
                            text: r.get(2)?,
                            location: latitude
                                .zip(longitude)
                                .map(|(latitude, longitude)| Coordinate { latitude, longitude }),
                            attachments: Vec::new(),
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let mut media_stmt = db.prepare(
                    "SELECT uri, source FROM post_attachments WHERE post_id = ?1 ORDER BY position",
                )?;
                for post in &mut posts {
                    post.attachments = media_stmt
                        .query_map(rusqlite::params![&post.id], |r| {
                            let uri: String = r.get(0)?;
                            let source: String = r.get(1)?;
                            Ok(Attachment {
                                uri,
                                source: AttachmentSource::from_db(&source)
                                    .unwrap_or(AttachmentSource::Library),
                            })
                        })?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                }

                Ok(Some(StoredThread {
                    id: thread_id,
                    author,
                    reply_audience: ReplyAudience::from_db(&audience).unwrap_or_default(),
                    created_at,
                    posts,
                }))
            })
            .await
    }

    /// Number of threads stored so far.
    pub async fn count_threads(&self) -> Result<i64, tokio_rusqlite::Error> {
        self.conn
            .call(|db| {
                let count: i64 = db.query_row("SELECT COUNT(*) FROM threads", [], |r| r.get(0))?;
                Ok(count)
            })
            .await
    }
}

#[async_trait]
impl PostSink for PostStore {
    async fn submit_post(
        &self,
        session: &Session,
        thread: &ThreadSubmission,
    ) -> Result<PostReceipt, SubmitError> {
        if thread.segments.is_empty() {
            return Err(SubmitError::EmptyThread);
        }
        let receipt = self.insert_thread(session, thread).await?;
        debug!(thread_id = %receipt.thread_id, author = %session.author, "thread stored");
        Ok(receipt)
    }
}
