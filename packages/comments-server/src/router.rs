//! Assembles the Axum [`Router`] from the handler modules.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers::{comments, health, AppState},
    middleware::{auth::Authenticator, Chain, Interceptor},
    service::CommentService,
};

/// Build the complete application router.
///
/// Reads and the health check are open. Create, update and delete go
/// through `auth`. Every request, matched or not, is logged.
pub fn build_router(service: Arc<dyn CommentService>, auth: Arc<dyn Authenticator>) -> Router {
    let state = AppState { service };

    let open = Router::new()
        .route("/api/comment", get(comments::list))
        .route("/api/comment/{id}", get(comments::get))
        .route("/api/health", get(health::health));

    let gated = Chain::new().then(Interceptor::Authenticate(auth)).wrap(
        Router::new()
            .route("/api/comment", post(comments::create))
            .route(
                "/api/comment/{id}",
                put(comments::update).delete(comments::delete),
            ),
    );

    Chain::new()
        .then(Interceptor::Logging)
        .wrap(open.merge(gated).with_state(state))
}
