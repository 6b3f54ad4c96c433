//! Server configuration, populated from environment variables.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Runtime configuration for the comments server.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `COMMENTS_BIND` | `0.0.0.0:8080` | TCP socket address to listen on |
/// | `COMMENTS_AUTH` | `bearer` | Auth strategy for write routes: `bearer` or `basic` |
/// | `COMMENTS_JWT_SECRET` | (required for `bearer`) | HMAC secret for bearer tokens |
/// | `COMMENTS_BASIC_USER` | (required for `basic`) | Basic-auth username |
/// | `COMMENTS_BASIC_PASSWORD` | (required for `basic`) | Basic-auth password |
/// | `DB_HOST` | (absent) | PostgreSQL host; selects the PostgreSQL store |
/// | `DB_PORT` | `5432` | PostgreSQL port |
/// | `DB_USERNAME` | `postgres` | PostgreSQL user |
/// | `DB_PASSWORD` | (empty) | PostgreSQL password |
/// | `DB_TABLE` | `postgres` | PostgreSQL database name |
/// | `SSL_MODE` | `require` | PostgreSQL `sslmode` |
/// | `COMMENTS_DB` | (absent) | SQLite file path, used when `DB_HOST` is absent |
///
/// With neither `DB_HOST` nor `COMMENTS_DB`, comments are kept in memory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address the server binds to.
    pub bind_addr: SocketAddr,

    /// Credentials checked on write routes.
    pub auth: AuthConfig,

    /// Where comments are persisted.
    pub store: StoreConfig,
}

/// Which credentials gate the write routes.
#[derive(Clone)]
pub enum AuthConfig {
    /// `Authorization: Bearer <jwt>`, HMAC-signed with `secret`.
    Bearer { secret: String },
    /// `Authorization: Basic ...` matching a fixed pair.
    Basic { username: String, password: String },
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("secret", &"[REDACTED]")
                .finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Memory,
    Sqlite { path: String },
    Postgres(PostgresConfig),
}

/// Connection parameters for the PostgreSQL store.
#[derive(Clone)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Database name. Read from `DB_TABLE` for compatibility with existing
    /// deployments.
    pub database: String,
    pub ssl_mode: PgSslMode,
}

impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

impl PostgresConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
            .ssl_mode(self.ssl_mode)
    }
}

/// A configuration value that cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be set when COMMENTS_AUTH={strategy}")]
    Missing {
        var: &'static str,
        strategy: &'static str,
    },

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ServerConfig {
    /// Populate config from environment variables, applying defaults where absent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Populate config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let bind_addr = parse_var("COMMENTS_BIND", get("COMMENTS_BIND"), "0.0.0.0:8080")?;

        let auth = match get("COMMENTS_AUTH").as_deref().unwrap_or("bearer") {
            "bearer" => AuthConfig::Bearer {
                secret: get("COMMENTS_JWT_SECRET").ok_or(ConfigError::Missing {
                    var: "COMMENTS_JWT_SECRET",
                    strategy: "bearer",
                })?,
            },
            "basic" => AuthConfig::Basic {
                username: get("COMMENTS_BASIC_USER").ok_or(ConfigError::Missing {
                    var: "COMMENTS_BASIC_USER",
                    strategy: "basic",
                })?,
                password: get("COMMENTS_BASIC_PASSWORD").ok_or(ConfigError::Missing {
                    var: "COMMENTS_BASIC_PASSWORD",
                    strategy: "basic",
                })?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "COMMENTS_AUTH",
                    reason: format!("expected `bearer` or `basic`, got {other:?}"),
                })
            }
        };

        let store = if let Some(host) = get("DB_HOST") {
            StoreConfig::Postgres(PostgresConfig {
                host,
                port: parse_var("DB_PORT", get("DB_PORT"), "5432")?,
                username: get("DB_USERNAME").unwrap_or_else(|| "postgres".into()),
                password: get("DB_PASSWORD").unwrap_or_default(),
                database: get("DB_TABLE").unwrap_or_else(|| "postgres".into()),
                ssl_mode: parse_var("SSL_MODE", get("SSL_MODE"), "require")?,
            })
        } else if let Some(path) = get("COMMENTS_DB") {
            StoreConfig::Sqlite { path }
        } else {
            StoreConfig::Memory
        };

        Ok(Self {
            bind_addr,
            auth,
            store,
        })
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .as_deref()
        .unwrap_or(default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        })
}
