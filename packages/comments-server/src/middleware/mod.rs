//! Request interceptors and the chain that composes them.

pub mod auth;
pub mod chain;
pub mod logging;

pub use chain::{Chain, Interceptor};
