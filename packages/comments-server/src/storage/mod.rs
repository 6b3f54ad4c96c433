//! Storage abstraction layer for comments.
//!
//! The [`CommentStore`] trait is the persistence contract the comment service
//! calls into. Stores know nothing about HTTP or authentication; they map
//! identifiers to rows and nothing else.
//!
//! # Implementations
//!
//! | Type | When to use |
//! |------|-------------|
//! | [`MemoryStore`] | Tests, conformance suite, throwaway local runs |
//! | [`SqliteStore`] | Single-host deployments; durable single-file database |
//! | [`PostgresStore`] | Production; configured through the `DB_*` variables |
//!
//! # Deletion
//!
//! All implementations soft-delete: a removed row keeps its data and gains a
//! `deleted_at` tombstone. Tombstoned rows are invisible to every read and
//! cannot be updated or deleted again.
//!
//! [`MemoryStore`]: memory::MemoryStore
//! [`SqliteStore`]: sqlite::SqliteStore
//! [`PostgresStore`]: postgres::PostgresStore

pub mod memory;
pub mod postgres;
pub mod sqlite;

use async_trait::async_trait;
use comments_api::{Comment, CommentDraft};

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Errors that storage operations can return.
///
/// A missing row is not an error at this layer; lookups return `Option` and
/// mutations return whether a live row was affected.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached (connection refused, pool timeout).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected a write (constraint violation, id overflow).
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// An unexpected error in the underlying storage backend.
    #[error("internal storage error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// CommentStore trait
// ---------------------------------------------------------------------------

/// The persistence contract for comments.
///
/// All methods are `async` and return `Result<_, StorageError>`. Implementations
/// must be `Send + Sync + 'static` so they can be held in an `Arc<dyn CommentStore>`.
/// Listings are ordered by `id` ascending.
#[async_trait]
pub trait CommentStore: Send + Sync + 'static {
    /// Retrieve a live comment by id. Returns `None` if absent or deleted.
    async fn find_by_id(&self, id: u64) -> Result<Option<Comment>, StorageError>;

    /// Return every live comment whose `slug` equals `slug`.
    async fn find_by_slug(&self, slug: &str) -> Result<Vec<Comment>, StorageError>;

    /// Return every live comment.
    async fn find_all(&self) -> Result<Vec<Comment>, StorageError>;

    /// Persist a new comment and return it with its assigned id and timestamps.
    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, StorageError>;

    /// Merge the non-empty fields of `patch` onto the live row `id`.
    ///
    /// Returns the row as stored after the merge, or `None` if there is no
    /// live row with that id. `updated_at` only moves when a field changed.
    async fn update(&self, id: u64, patch: &CommentDraft)
        -> Result<Option<Comment>, StorageError>;

    /// Tombstone the live row `id`. Returns `false` if there was none.
    async fn delete(&self, id: u64) -> Result<bool, StorageError>;
}
