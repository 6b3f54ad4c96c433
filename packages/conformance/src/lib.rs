//! Shared helpers for the comments conformance test suite.
//!
//! Provides [`spawn_server`]: binds a `TcpListener` on an ephemeral port,
//! wires up an in-process server backed by a fresh `MemoryStore`, and returns
//! the base URL together with the store so tests can seed rows without going
//! through the HTTP layer.

use std::sync::Arc;

use comments_server::{
    authenticator, build_router, AuthConfig, CommentStore, MemoryStore, StoreCommentService,
};

/// Shared secret used by [`spawn_bearer_server`].
pub const TEST_SECRET: &str = "conformance-secret";

/// Credential pair used by [`spawn_basic_server`].
pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "password";

/// Start an ephemeral in-process server and return `(base_url, store)`.
///
/// The server runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`. The returned `String` is the root URL, e.g.
/// `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the TCP listener cannot be bound.
pub async fn spawn_server(auth: AuthConfig) -> (String, Arc<MemoryStore>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let mem_store = Arc::new(MemoryStore::new());
    let store: Arc<dyn CommentStore> = Arc::clone(&mem_store) as Arc<dyn CommentStore>;
    let service = Arc::new(StoreCommentService::new(store));
    let router = build_router(service, authenticator(&auth));

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("conformance server error");
    });

    (base_url, mem_store)
}

/// [`spawn_server`] with bearer auth keyed on [`TEST_SECRET`].
pub async fn spawn_bearer_server() -> (String, Arc<MemoryStore>) {
    spawn_server(AuthConfig::Bearer {
        secret: TEST_SECRET.into(),
    })
    .await
}

/// [`spawn_server`] with basic auth on [`TEST_USER`]/[`TEST_PASSWORD`].
pub async fn spawn_basic_server() -> (String, Arc<MemoryStore>) {
    spawn_server(AuthConfig::Basic {
        username: TEST_USER.into(),
        password: TEST_PASSWORD.into(),
    })
    .await
}
