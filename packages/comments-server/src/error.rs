//! Application-level error type returned by handlers.
//!
//! Every variant except [`AppError::Encoding`] renders as an [`Envelope`]
//! with the request context in `Message` and the underlying failure in
//! `Error`, under the status code for its kind.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use comments_api::Envelope;
use serde::Serialize;

use crate::service::ServiceError;

/// Content type of every JSON body the server writes.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// An error that a handler can return; converts directly to an HTTP response.
#[derive(Debug)]
pub enum AppError {
    /// Malformed id or body. Never reaches the service.
    BadRequest { context: String, error: String },
    /// The service found no matching comment.
    NotFound { context: String, error: String },
    /// The store failed.
    Internal { context: String, error: String },
    /// Credentials missing or rejected.
    Unauthorized(String),
    /// A response body could not be serialised.
    Encoding(String),
}

impl AppError {
    pub fn bad_request(context: impl Into<String>, error: impl ToString) -> Self {
        Self::BadRequest {
            context: context.into(),
            error: error.to_string(),
        }
    }

    /// Map a service failure to its status class, keeping the request context.
    pub fn service(context: impl Into<String>, err: ServiceError) -> Self {
        let context = context.into();
        match err {
            ServiceError::NotFound => Self::NotFound {
                context,
                error: err.to_string(),
            },
            ServiceError::Store(ref e) => {
                tracing::error!(error = %e, "{context}");
                Self::Internal {
                    context,
                    error: err.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            AppError::BadRequest { context, error } => {
                (StatusCode::BAD_REQUEST, Envelope::error(context, error))
            }
            AppError::NotFound { context, error } => {
                (StatusCode::NOT_FOUND, Envelope::error(context, error))
            }
            AppError::Internal { context, error } => {
                (StatusCode::INTERNAL_SERVER_ERROR, Envelope::error(context, error))
            }
            AppError::Unauthorized(reason) => (
                StatusCode::UNAUTHORIZED,
                Envelope::error(comments_api::messages::NOT_AUTHORIZED, reason),
            ),
            AppError::Encoding(reason) => {
                tracing::error!(error = %reason, "{}", comments_api::messages::ENCODE_FAILED);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        json_response(status, &envelope).unwrap_or_else(IntoResponse::into_response)
    }
}

/// Serialise `value` completely, then wrap it in a response.
///
/// Nothing is written if serialisation fails, so a client never sees a
/// truncated body.
pub fn json_response<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> Result<Response, AppError> {
    let body = serde_json::to_vec(value).map_err(|e| AppError::Encoding(e.to_string()))?;
    Ok((
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response())
}
