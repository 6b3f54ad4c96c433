//! The comment service: the CRUD contract handlers call into.
//!
//! [`CommentService`] is the seam between HTTP and persistence. Handlers only
//! ever hold an `Arc<dyn CommentService>`, so the whole HTTP layer can be
//! exercised against a test double. [`StoreCommentService`] is the real
//! implementation, translating [`CommentStore`] results into the
//! [`ServiceError`] taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use comments_api::{Comment, CommentDraft};

use crate::storage::{CommentStore, StorageError};

/// Failure of a service operation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No live comment matches the requested id.
    #[error("record not found")]
    NotFound,

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StorageError),
}

/// The comment CRUD contract.
#[async_trait]
pub trait CommentService: Send + Sync + 'static {
    async fn get_comment(&self, id: u64) -> Result<Comment, ServiceError>;

    /// Comments attached to `slug`. An unknown slug yields an empty list.
    async fn get_comments_by_slug(&self, slug: &str) -> Result<Vec<Comment>, ServiceError>;

    async fn get_all_comments(&self) -> Result<Vec<Comment>, ServiceError>;

    /// Store a new comment. The store assigns the id.
    async fn post_comment(&self, draft: CommentDraft) -> Result<Comment, ServiceError>;

    /// Merge the non-empty fields of `patch` onto comment `id` and return the
    /// comment as stored afterwards.
    async fn update_comment(&self, id: u64, patch: CommentDraft)
        -> Result<Comment, ServiceError>;

    async fn delete_comment(&self, id: u64) -> Result<(), ServiceError>;
}

/// [`CommentService`] backed by a [`CommentStore`].
#[derive(Clone)]
pub struct StoreCommentService {
    store: Arc<dyn CommentStore>,
}

impl StoreCommentService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommentService for StoreCommentService {
    async fn get_comment(&self, id: u64) -> Result<Comment, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    async fn get_comments_by_slug(&self, slug: &str) -> Result<Vec<Comment>, ServiceError> {
        Ok(self.store.find_by_slug(slug).await?)
    }

    async fn get_all_comments(&self) -> Result<Vec<Comment>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    async fn post_comment(&self, draft: CommentDraft) -> Result<Comment, ServiceError> {
        let comment = self.store.insert(&draft).await?;
        tracing::debug!(id = comment.id, slug = %comment.slug, "comment created");
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: u64,
        patch: CommentDraft,
    ) -> Result<Comment, ServiceError> {
        self.store
            .update(id, &patch)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    async fn delete_comment(&self, id: u64) -> Result<(), ServiceError> {
        if self.store.delete(id).await? {
            tracing::debug!(id, "comment deleted");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
