//! PostgreSQL-backed storage implementation.
//!
//! Uses an `sqlx` connection pool. The schema is applied by [`PostgresStore::migrate`],
//! which `main` calls once before the listener is bound.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comments_api::{Comment, CommentDraft};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use super::{CommentStore, StorageError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS comments (
    id          BIGSERIAL PRIMARY KEY,
    slug        TEXT NOT NULL DEFAULT '',
    body        TEXT NOT NULL DEFAULT '',
    author      TEXT NOT NULL DEFAULT '',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at  TIMESTAMPTZ
)";

const SLUG_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_comments_slug ON comments(slug) WHERE deleted_at IS NULL";

const COLUMNS: &str = "id, slug, body, author, created_at, updated_at";

/// PostgreSQL implementation of [`CommentStore`].
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool and verify the server answers.
    pub async fn connect(options: PgConnectOptions) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect_with(options)
            .await
            .map_err(map_err)?;
        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(map_err)?;
        Ok(Self::new(pool))
    }

    /// Create the `comments` table and its index if they do not exist.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        sqlx::query(SLUG_INDEX)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(())
    }
}

fn map_err(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Tls(_) => {
            StorageError::Unavailable(e.to_string())
        }
        sqlx::Error::Database(ref db)
            if db.is_unique_violation() || db.is_foreign_key_violation() || db.is_check_violation() =>
        {
            StorageError::Constraint(e.to_string())
        }
        other => StorageError::Internal(other.to_string()),
    }
}

fn row_to_comment(row: &PgRow) -> Result<Comment, StorageError> {
    let id: i64 = row.try_get("id").map_err(map_err)?;
    Ok(Comment {
        id: u64::try_from(id)
            .map_err(|_| StorageError::Internal(format!("negative comment id {id}")))?,
        slug: row.try_get("slug").map_err(map_err)?,
        body: row.try_get("body").map_err(map_err)?,
        author: row.try_get("author").map_err(map_err)?,
        created_at: Some(row.try_get::<DateTime<Utc>, _>("created_at").map_err(map_err)?),
        updated_at: Some(row.try_get::<DateTime<Utc>, _>("updated_at").map_err(map_err)?),
    })
}

fn to_sql_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

#[async_trait]
impl CommentStore for PostgresStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Comment>, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM comments WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.as_ref().map(row_to_comment).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM comments
             WHERE slug = $1 AND deleted_at IS NULL ORDER BY id ASC"
        ))
        .bind(slug)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        rows.iter().map(row_to_comment).collect()
    }

    async fn find_all(&self) -> Result<Vec<Comment>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM comments WHERE deleted_at IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        rows.iter().map(row_to_comment).collect()
    }

    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, StorageError> {
        let row = sqlx::query(&format!(
            "INSERT INTO comments (slug, body, author) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        ))
        .bind(&draft.slug)
        .bind(&draft.body)
        .bind(&draft.author)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        row_to_comment(&row)
    }

    async fn update(
        &self,
        id: u64,
        patch: &CommentDraft,
    ) -> Result<Option<Comment>, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(None);
        };
        // Empty patch fields keep the stored value; `updated_at` only moves
        // when the merged row differs from the stored one.
        let row = sqlx::query(&format!(
            "UPDATE comments SET
                 slug   = COALESCE(NULLIF($2, ''), slug),
                 body   = COALESCE(NULLIF($3, ''), body),
                 author = COALESCE(NULLIF($4, ''), author),
                 updated_at = CASE
                     WHEN (COALESCE(NULLIF($2, ''), slug), COALESCE(NULLIF($3, ''), body),
                           COALESCE(NULLIF($4, ''), author)) IS DISTINCT FROM (slug, body, author)
                     THEN now() ELSE updated_at END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.slug)
        .bind(&patch.body)
        .bind(&patch.author)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.as_ref().map(row_to_comment).transpose()
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let Some(id) = to_sql_id(id) else {
            return Ok(false);
        };
        let result = sqlx::query(
            "UPDATE comments SET deleted_at = now() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(result.rows_affected() > 0)
    }
}
