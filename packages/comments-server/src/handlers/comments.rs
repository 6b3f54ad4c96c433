//! Comment handlers: list, get, create, update, delete.
//!
//! Ids arrive as raw path strings and are parsed here so that a bad id
//! produces the comment envelope instead of the framework's rejection.
//! Bodies are taken as bytes and extractor rejections are caught for the
//! same reason.

use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Extension,
};
use comments_api::{messages, CommentDraft, Envelope};
use serde::Deserialize;

use crate::{
    error::{json_response, AppError},
    middleware::auth::Principal,
};

use super::AppState;

/// Query parameters for `GET /api/comment`.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    /// Only return comments attached to this slug.
    pub slug: Option<String>,
}

/// Parse a decimal id. Signs are rejected, so `+5` and `-5` both fail.
fn parse_id(raw: &str) -> Result<u64, AppError> {
    if raw.starts_with('+') {
        return Err(AppError::bad_request(
            messages::BAD_ID,
            "invalid digit found in string",
        ));
    }
    raw.parse::<u64>()
        .map_err(|e| AppError::bad_request(messages::BAD_ID, e))
}

/// Unwrap the `{id}` segment, returning it raw alongside the parsed value.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<(String, u64), AppError> {
    let Path(raw) = path.map_err(|e| AppError::bad_request(messages::BAD_ID, e.body_text()))?;
    let id = parse_id(&raw)?;
    Ok((raw, id))
}

fn parse_draft(body: &[u8]) -> Result<CommentDraft, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::bad_request(messages::BAD_BODY, e))
}

// ---------------------------------------------------------------------------
// GET /api/comment
// ---------------------------------------------------------------------------

/// `GET /api/comment`: every live comment, or those for `?slug=`.
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) =
        query.map_err(|e| AppError::bad_request(messages::BAD_QUERY, e.body_text()))?;

    let comments = match params.slug.as_deref() {
        Some(slug) => state.service.get_comments_by_slug(slug).await,
        None => state.service.get_all_comments().await,
    }
    .map_err(|e| AppError::service(messages::LIST_FAILED, e))?;

    json_response(StatusCode::OK, &comments)
}

// ---------------------------------------------------------------------------
// GET /api/comment/{id}
// ---------------------------------------------------------------------------

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let (_, id) = path_id(path)?;
    let comment = state
        .service
        .get_comment(id)
        .await
        .map_err(|e| AppError::service(messages::GET_FAILED, e))?;

    json_response(StatusCode::OK, &comment)
}

// ---------------------------------------------------------------------------
// POST /api/comment
// ---------------------------------------------------------------------------

/// `POST /api/comment`: store a new comment. Any `id` in the body is ignored.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> Result<Response, AppError> {
    let draft = parse_draft(&body)?;
    let comment = state
        .service
        .post_comment(draft)
        .await
        .map_err(|e| AppError::service(messages::CREATE_FAILED, e))?;

    tracing::info!(id = comment.id, subject = %principal.subject, "comment created");
    json_response(StatusCode::OK, &comment)
}

// ---------------------------------------------------------------------------
// PUT /api/comment/{id}
// ---------------------------------------------------------------------------

/// `PUT /api/comment/{id}`: merge the non-empty fields of the body onto the
/// stored comment and return the result.
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Response, AppError> {
    let (_, id) = path_id(path)?;
    let patch = parse_draft(&body)?;
    let comment = state
        .service
        .update_comment(id, patch)
        .await
        .map_err(|e| AppError::service(messages::UPDATE_FAILED, e))?;

    tracing::info!(id, subject = %principal.subject, "comment updated");
    json_response(StatusCode::OK, &comment)
}

// ---------------------------------------------------------------------------
// DELETE /api/comment/{id}
// ---------------------------------------------------------------------------

pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let (raw, id) = path_id(path)?;
    state
        .service
        .delete_comment(id)
        .await
        .map_err(|e| AppError::service(messages::delete_failed(&raw), e))?;

    tracing::info!(id, subject = %principal.subject, "comment deleted");
    json_response(StatusCode::OK, &Envelope::message(messages::DELETED))
}
