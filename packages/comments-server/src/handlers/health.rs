//! `GET /api/health`: liveness probe.

use axum::{http::StatusCode, response::Response};
use comments_api::{messages, Envelope};

use crate::error::{json_response, AppError};

pub async fn health() -> Result<Response, AppError> {
    json_response(StatusCode::OK, &Envelope::message(messages::ALIVE))
}
