//! Ordered interceptor list, composed once when the router is built.
//!
//! Interceptors run in the order they were added: the first one sees the
//! request first and the response last.

use std::sync::Arc;

use axum::{middleware, Router};

use super::{
    auth::{require_auth, Authenticator},
    logging::log_request,
};

/// A request interceptor.
#[derive(Clone)]
pub enum Interceptor {
    /// Log every request, including ones that match no route.
    Logging,
    /// Reject requests that `Authenticator` does not accept. Applied as a
    /// route layer, so unmatched paths still fall through to 404.
    Authenticate(Arc<dyn Authenticator>),
}

impl Interceptor {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Logging => "logging",
            Self::Authenticate(_) => "authenticate",
        }
    }
}

#[derive(Clone, Default)]
pub struct Chain {
    interceptors: Vec<Interceptor>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `interceptor`; it runs after everything already in the chain.
    pub fn then(mut self, interceptor: Interceptor) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(Interceptor::name).collect()
    }

    /// Wrap `router` in every interceptor of the chain.
    pub fn wrap<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // Axum runs the most recently added layer first, so fold back to front.
        self.interceptors
            .iter()
            .rev()
            .fold(router, |router, interceptor| match interceptor {
                Interceptor::Logging => router.layer(middleware::from_fn(log_request)),
                Interceptor::Authenticate(auth) => router.route_layer(
                    middleware::from_fn_with_state(Arc::clone(auth), require_auth),
                ),
            })
    }
}
