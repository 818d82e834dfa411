/// DDL to create the schema_version tracking table.
///
/// Applied unconditionally on every DB open (before checking the version),
/// using `IF NOT EXISTS` so it is safe to run multiple times.
pub const SCHEMA_VERSION_DDL: &str = "
    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER NOT NULL
    ) STRICT;
";

/// DDL for the full v1 schema.
///
/// Contains three tables:
/// - `threads`: one row per submitted thread, keyed by UUID v4 text.
/// - `posts`: one row per segment, ordered by `position` within its thread.
/// - `post_attachments`: media references of a post, ordered by `position`.
///
/// All tables use `STRICT` mode for type enforcement.
/// Foreign keys use `ON DELETE CASCADE` so removing a thread cleans up all child rows.
pub const SCHEMA_V1_SQL: &str = "
    CREATE TABLE IF NOT EXISTS threads (
        id             TEXT    PRIMARY KEY,
        author         TEXT    NOT NULL,
        reply_audience TEXT    NOT NULL DEFAULT 'anyone'
                               CHECK(reply_audience IN ('anyone', 'following', 'mentioned')),
        created_at     INTEGER NOT NULL
    ) STRICT;

    CREATE TABLE IF NOT EXISTS posts (
        id         TEXT    PRIMARY KEY,
        thread_id  TEXT    NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
        position   INTEGER NOT NULL,
        text       TEXT    NOT NULL,
        latitude   REAL,
        longitude  REAL,
        UNIQUE (thread_id, position)
    ) STRICT;

    CREATE TABLE IF NOT EXISTS post_attachments (
        post_id   TEXT    NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
        position  INTEGER NOT NULL,
        uri       TEXT    NOT NULL,
        source    TEXT    NOT NULL CHECK(source IN ('library', 'camera')),
        PRIMARY KEY (post_id, position)
    ) STRICT;
";

/// Runs forward-only schema migration to migrate the DB to the latest version.
///
/// This function is idempotent: safe to call on every open regardless of
/// whether the schema has already been applied.
///
/// # Process
///
/// 1. Creates the `schema_version` table if it does not exist.
/// 2. Reads the current version (`0` if the table is empty).
/// 3. If the version is below 1, applies `SCHEMA_V1_SQL` inside a
///    `BEGIN IMMEDIATE` transaction and records `version = 1`.
///
/// # Errors
///
/// Returns `rusqlite::Error` if the DDL fails or the version row cannot be read.
pub fn migrate(db: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    db.execute_batch(SCHEMA_VERSION_DDL)?;

    let version: i64 = db
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if version < 1 {
        let tx = db.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        tx.execute_batch(SCHEMA_V1_SQL)?;
        tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;
        tx.commit()?;
    }

    Ok(())
}
