//! Credential checks for write routes.
//!
//! Two interchangeable [`Authenticator`] strategies:
//! - [`BasicAuth`]: `Authorization: Basic base64(user:password)` against a fixed pair.
//! - [`BearerAuth`]: `Authorization: Bearer <jwt>`, verified with a shared HMAC secret.
//!
//! [`require_auth`] runs the configured strategy in front of a route and
//! answers 401 without calling the route when it fails.
//!
//! Also exposes [`issue_token`] for minting bearer tokens the server accepts.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{config::AuthConfig, error::AppError};

// ---------------------------------------------------------------------------
// Auth errors
// ---------------------------------------------------------------------------

/// Why a request was not authenticated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("expected {0} authorization scheme")]
    WrongScheme(&'static str),

    #[error("malformed credentials: {0}")]
    Malformed(String),

    #[error("invalid username or password")]
    BadCredentials,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// The caller an [`Authenticator`] accepted.
///
/// Inserted into request extensions for handlers that want it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Basic-auth username, or the token's `sub` claim (empty if absent).
    pub subject: String,
}

// ---------------------------------------------------------------------------
// Authenticator trait
// ---------------------------------------------------------------------------

/// A credential-checking strategy.
pub trait Authenticator: Send + Sync + 'static {
    /// The `Authorization` scheme this strategy expects, e.g. `"Bearer"`.
    fn scheme(&self) -> &'static str;

    /// Check the credentials in `headers`.
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError>;
}

/// Build the strategy selected by configuration.
pub fn authenticator(config: &AuthConfig) -> Arc<dyn Authenticator> {
    match config {
        AuthConfig::Bearer { secret } => Arc::new(BearerAuth::new(secret.as_bytes())),
        AuthConfig::Basic { username, password } => {
            Arc::new(BasicAuth::new(username.clone(), password.clone()))
        }
    }
}

/// Return the credentials part of `Authorization: <scheme> <credentials>`.
///
/// The scheme is matched case-insensitively.
fn credentials<'h>(headers: &'h HeaderMap, scheme: &'static str) -> Result<&'h str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::Malformed("Authorization header is not ASCII".into()))?;

    let (given, rest) = value.split_once(' ').unwrap_or((value, ""));
    if !given.eq_ignore_ascii_case(scheme) {
        return Err(AuthError::WrongScheme(scheme));
    }
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(AuthError::Malformed(format!("{scheme} credentials are empty")));
    }
    Ok(rest)
}

/// Constant-time comparison; unequal lengths still cost one full comparison.
fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

// ---------------------------------------------------------------------------
// Basic
// ---------------------------------------------------------------------------

/// HTTP Basic authentication against one username/password pair.
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Authenticator for BasicAuth {
    fn scheme(&self) -> &'static str {
        "Basic"
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let encoded = credentials(headers, self.scheme())?;
        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| AuthError::Malformed(format!("invalid base64: {e}")))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| AuthError::Malformed("credentials are not UTF-8".into()))?;
        let (user, pass) = decoded
            .split_once(':')
            .ok_or_else(|| AuthError::Malformed("expected user:password".into()))?;

        // Non-short-circuit `&` so both halves are always compared.
        let ok = constant_time_eq(user.as_bytes(), self.username.as_bytes())
            & constant_time_eq(pass.as_bytes(), self.password.as_bytes());
        if !ok {
            return Err(AuthError::BadCredentials);
        }
        Ok(Principal {
            subject: user.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Bearer
// ---------------------------------------------------------------------------

/// Only the HMAC family is accepted. Anything else is rejected before the
/// signature is looked at, which closes off algorithm-confusion attacks.
const ALLOWED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Claims carried by bearer tokens. `exp` is mandatory.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

/// JWT bearer-token authentication with a shared HMAC secret.
pub struct BearerAuth {
    key: DecodingKey,
    validation: Validation,
}

impl BearerAuth {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ALLOWED_ALGORITHMS.to_vec();
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl Authenticator for BearerAuth {
    fn scheme(&self) -> &'static str {
        "Bearer"
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = credentials(headers, self.scheme())?;
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Principal {
            subject: data.claims.sub.unwrap_or_default(),
        })
    }
}

/// Mint an HS256 token for `subject`, valid for `ttl` from now.
pub fn issue_token(
    secret: &[u8],
    subject: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = jsonwebtoken::get_current_timestamp();
    let claims = Claims {
        sub: Some(subject.to_string()),
        exp: now.saturating_add(ttl.as_secs()),
        iat: Some(now),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

// ---------------------------------------------------------------------------
// Middleware function
// ---------------------------------------------------------------------------

/// Axum `from_fn_with_state` middleware that gates a route on `auth`.
pub async fn require_auth(
    State(auth): State<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    match auth.authenticate(req.headers()) {
        Ok(principal) => {
            tracing::debug!(subject = %principal.subject, "authenticated");
            req.extensions_mut().insert(principal);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = %e,
                "rejected unauthenticated request"
            );
            AppError::Unauthorized(e.to_string()).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
