//! Request logging interceptor.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Log method and path before the request is forwarded, and the resulting
/// status afterwards. The response passes through untouched.
pub async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    tracing::info!(%method, %path, "request");

    let started = Instant::now();
    let resp = next.run(req).await;
    tracing::debug!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "response"
    );
    resp
}
