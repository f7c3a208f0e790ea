//! Server configuration, read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Resource server configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Listen address (env: BIND_ADDR)
    pub bind_addr: SocketAddr,
    /// HS256 signing secret shared with the token issuer (env: JWT_SECRET)
    pub jwt_secret: String,
    /// Expected `iss` claim, if any (env: JWT_ISSUER)
    pub jwt_issuer: Option<String>,
    /// Expected `aud` claim, if any (env: JWT_AUDIENCE)
    pub jwt_audience: Option<String>,
    /// Postgres URL; without one the directory lives in memory (env: DATABASE_URL)
    pub database_url: Option<String>,
    /// Pool size (env: DATABASE_MAX_CONNECTIONS)
    pub database_max_connections: u32,
    /// Create the schema on startup (env: RUN_MIGRATIONS)
    pub run_migrations: bool,
}

impl core::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_max_connections", &self.database_max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl ApiConfig {
    /// Load `.env` (if present), then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(v) => parse("BIND_ADDR", &v)?,
            None => parse("BIND_ADDR", DEFAULT_BIND_ADDR)?,
        };

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let database_url = var("DATABASE_URL");
        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(v) => parse("DATABASE_MAX_CONNECTIONS", &v)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let run_migrations = match var("RUN_MIGRATIONS") {
            Some(v) => parse_bool("RUN_MIGRATIONS", &v)?,
            None => database_url.is_some(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_issuer: var("JWT_ISSUER"),
            jwt_audience: var("JWT_AUDIENCE"),
            database_url,
            database_max_connections,
            run_migrations,
        })
    }
}

fn parse<T: core::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
