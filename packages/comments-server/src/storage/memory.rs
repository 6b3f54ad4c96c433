//! In-memory storage implementation.
//!
//! All data is held in RAM behind a [`RwLock`] and is lost when the process
//! exits. Use this for tests, the conformance suite, and local runs without a
//! database.
//!
//! Rows live in a [`BTreeMap`] keyed by id, so listings come out in id order
//! without sorting.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use comments_api::{Comment, CommentDraft};

use super::{CommentStore, StorageError};

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

struct Row {
    comment: Comment,
    deleted_at: Option<DateTime<Utc>>,
}

impl Row {
    fn live(&self) -> Option<&Comment> {
        self.deleted_at.is_none().then_some(&self.comment)
    }
}

struct Inner {
    /// Last id handed out. Ids are never reused, even after deletion.
    last_id: u64,
    rows: BTreeMap<u64, Row>,
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Thread-safe, in-memory implementation of [`CommentStore`].
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                last_id: 0,
                rows: BTreeMap::new(),
            }),
        }
    }

    // A panic while holding the lock cannot leave a row half-written, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|p| p.into_inner())
    }

    fn collect_live(&self, keep: impl Fn(&Comment) -> bool) -> Vec<Comment> {
        self.read()
            .rows
            .values()
            .filter_map(Row::live)
            .filter(|c| keep(c))
            .cloned()
            .collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// CommentStore impl
// ---------------------------------------------------------------------------

#[async_trait]
impl CommentStore for MemoryStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Comment>, StorageError> {
        Ok(self.read().rows.get(&id).and_then(Row::live).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Vec<Comment>, StorageError> {
        Ok(self.collect_live(|c| c.slug == slug))
    }

    async fn find_all(&self) -> Result<Vec<Comment>, StorageError> {
        Ok(self.collect_live(|_| true))
    }

    async fn insert(&self, draft: &CommentDraft) -> Result<Comment, StorageError> {
        let mut inner = self.write();
        let id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| StorageError::Constraint("comment id space exhausted".into()))?;
        inner.last_id = id;

        let now = Utc::now();
        let comment = Comment {
            id,
            slug: draft.slug.clone(),
            body: draft.body.clone(),
            author: draft.author.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.rows.insert(
            id,
            Row {
                comment: comment.clone(),
                deleted_at: None,
            },
        );
        Ok(comment)
    }

    async fn update(
        &self,
        id: u64,
        patch: &CommentDraft,
    ) -> Result<Option<Comment>, StorageError> {
        let mut inner = self.write();
        let Some(row) = inner.rows.get_mut(&id).filter(|r| r.deleted_at.is_none()) else {
            return Ok(None);
        };
        if patch.merge_into(&mut row.comment) {
            row.comment.updated_at = Some(Utc::now());
        }
        Ok(Some(row.comment.clone()))
    }

    async fn delete(&self, id: u64) -> Result<bool, StorageError> {
        let mut inner = self.write();
        match inner.rows.get_mut(&id) {
            Some(row) if row.deleted_at.is_none() => {
                row.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
