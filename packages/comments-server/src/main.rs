//! `comments-server`: HTTP service for storing and serving comments.
//!
//! # Quick start
//!
//! ```sh
//! # In-memory store, bearer tokens signed with a shared secret:
//! COMMENTS_JWT_SECRET=change-me comments-server
//!
//! # Persistent SQLite store with basic auth:
//! COMMENTS_DB=./comments.db COMMENTS_AUTH=basic \
//!   COMMENTS_BASIC_USER=admin COMMENTS_BASIC_PASSWORD=change-me comments-server
//!
//! # PostgreSQL:
//! DB_HOST=localhost DB_USERNAME=postgres DB_PASSWORD=postgres DB_TABLE=postgres \
//!   SSL_MODE=disable COMMENTS_JWT_SECRET=change-me comments-server
//! ```
//!
//! # Environment variables
//!
//! See [`comments_server::ServerConfig`] for the full list.

use std::sync::Arc;

use comments_server::{
    authenticator, build_router,
    storage::{postgres::PostgresStore, sqlite::SqliteStore},
    CommentStore, MemoryStore, ServerConfig, StoreCommentService, StoreConfig,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comments_server=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let store = open_store(&config.store).await?;
    let service = Arc::new(StoreCommentService::new(store));
    let app = build_router(service, authenticator(&config.auth));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn open_store(config: &StoreConfig) -> Result<Arc<dyn CommentStore>, BoxError> {
    let store: Arc<dyn CommentStore> = match config {
        StoreConfig::Postgres(pg) => {
            tracing::info!(host = %pg.host, port = pg.port, database = %pg.database, "storage: PostgreSQL");
            let store = PostgresStore::connect(pg.connect_options()).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        StoreConfig::Sqlite { path } => {
            tracing::info!("storage: SQLite at {path}");
            Arc::new(
                SqliteStore::open(path)
                    .map_err(|e| format!("failed to open SQLite database at {path}: {e}"))?,
            )
        }
        StoreConfig::Memory => {
            tracing::warn!("storage: in-memory (data will not survive restart)");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
