//! Public surface for the `comments-server` crate.
//!
//! Exposes the router builder, config, and store types so that external
//! crates (the conformance suite, the CLI) can run an in-process server or
//! mint tokens without spawning a subprocess.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod storage;

pub use config::{AuthConfig, ServerConfig, StoreConfig};
pub use middleware::auth::{authenticator, issue_token, Authenticator};
pub use router::build_router;
pub use service::{CommentService, ServiceError, StoreCommentService};
pub use storage::{memory::MemoryStore, CommentStore};
