//! HTTP request handlers for the comment endpoints.
//!
//! Handlers parse and validate the request, call the [`CommentService`], and
//! render the result. Nothing that fails validation reaches the service.

pub mod comments;
pub mod health;

use std::sync::Arc;

use crate::service::CommentService;

/// Shared application state threaded through all Axum handlers via [`axum::extract::State`].
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn CommentService>,
}
