//! SQLite-backed storage implementation.
//!
//! Uses `rusqlite` (with bundled SQLite) wrapped in an `Arc<Mutex<Connection>>`
//! to satisfy the `Send + Sync` requirements. All blocking calls are offloaded
//! to a thread-pool via `tokio::task::spawn_blocking`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comments_api::{Comment, CommentDraft};
use rusqlite::{params, Connection, OptionalExtension};

use super::{CommentStore, StorageError};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS comments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    slug        TEXT NOT NULL DEFAULT '',
    body        TEXT NOT NULL DEFAULT '',
    author      TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    deleted_at  TEXT
);
CREATE INDEX IF NOT EXISTS idx_comments_slug       ON comments(slug);
CREATE INDEX IF NOT EXISTS idx_comments_deleted_at ON comments(deleted_at);
";

const COLUMNS: &str = "id, slug, body, author, created_at, updated_at";

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

/// SQLite-backed implementation of [`CommentStore`].
///
/// Holds a single database connection protected by a `Mutex`. All operations
/// run inside `spawn_blocking` to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `path` and apply the schema.
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Open an in-memory SQLite database (data is lost when dropped).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking thread-pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().unwrap_or_else(|p| p.into_inner());
            f(&mut conn)
        })
        .await
        .map_err(|e| StorageError::Internal(format!("task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn map_err(e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(code, msg)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::Constraint(msg.unwrap_or_else(|| code.to_string()))
        }
        rusqlite::Error::SqliteFailure(code, msg)
            if matches!(
                code.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            StorageError::Unavailable(msg.unwrap_or_else(|| code.to_string()))
        }
        other => StorageError::Internal(other.to_string()),
    }
}

fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
    let id: i64 = row.get(0)?;
    Ok(Comment {
        id: u64::try_from(id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Integer, Box::new(e))
        })?,
        slug: row.get(1)?,
        body: row.get(2)?,
        author: row.get(3)?,
        created_at: Some(row.get::<_, DateTime<Utc>>(4)?),
        updated_at: Some(row.get::<_, DateTime<Utc>>(5)?),
    })
}

fn to_sql_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

fn select_live(conn: &Connection, id: i64) -> Result<Option<Comment>, StorageError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM comments WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        row_to_comment,
    )
    .optional()
    .map_err(map_err)
}

fn select_many(
    conn: &Connection,
    filter: &str,
    args: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Comment>, StorageError> {
    let sql = format!(
        "SELECT {COLUMNS} FROM comments WHERE deleted_at IS NULL {filter} ORDER BY id ASC"
    );
    let mut stmt = conn.prepare(&sql).map_err(map_err)?;
    let rows = stmt
        .query_map(args, row_to_comment)
        .map_err(map_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(map_err)?;
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CommentStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl CommentStore for SqliteStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Comment>, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(None);
        };
        self.blocking(move |conn| select_live(conn, id)).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Vec<Comment>, StorageError> {
        let slug = slug.to_string();
        self.blocking(move |conn| select_many(conn, "AND slug = ?1", &[&slug]))
            .await
    }

    async fn find_all(&self) -> Result<Vec<Comment>, StorageError> {
        self.blocking(|conn| select_many(conn, "", &[])).await
    }

    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, StorageError> {
        let draft = draft.clone();
        self.blocking(move |conn| {
            let now = Utc::now();
            conn.execute(
                "INSERT INTO comments (slug, body, author, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![draft.slug, draft.body, draft.author, now],
            )
            .map_err(map_err)?;
            let id = conn.last_insert_rowid();
            select_live(conn, id)?
                .ok_or_else(|| StorageError::Internal(format!("inserted comment {id} vanished")))
        })
        .await
    }

    async fn update(
        &self,
        id: u64,
        patch: &CommentDraft,
    ) -> Result<Option<Comment>, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(None);
        };
        let patch = patch.clone();
        self.blocking(move |conn| {
            let tx = conn.transaction().map_err(map_err)?;
            let Some(mut comment) = select_live(&tx, id)? else {
                return Ok(None);
            };
            if patch.merge_into(&mut comment) {
                let now = Utc::now();
                tx.execute(
                    "UPDATE comments SET slug = ?2, body = ?3, author = ?4, updated_at = ?5
                     WHERE id = ?1",
                    params![id, comment.slug, comment.body, comment.author, now],
                )
                .map_err(map_err)?;
                comment.updated_at = Some(now);
            }
            tx.commit().map_err(map_err)?;
            Ok(Some(comment))
        })
        .await
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(false);
        };
        self.blocking(move |conn| {
            let affected = conn
                .execute(
                    "UPDATE comments SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                    params![id, Utc::now()],
                )
                .map_err(map_err)?;
            Ok(affected > 0)
        })
        .await
    }
}
