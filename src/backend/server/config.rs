/**
 * Server Configuration
 *
 * Settings are read from the environment (after `dotenv` has loaded `.env`):
 *
 * | Variable             | Default | Meaning                                   |
 * |----------------------|---------|-------------------------------------------|
 * | `SERVER_PORT`        | 3000    | TCP port to bind                          |
 * | `DATABASE_URL`       | unset   | PostgreSQL URL; in-memory store if unset  |
 * | `JWT_SECRET`         | -       | Token signing key (dev fallback in debug) |
 * | `TOKEN_TTL_DAYS`     | 30      | Token lifetime (1..=3650)                 |
 * | `REQUIRE_FRIENDSHIP` | false   | Direct messages between friends only      |
 * | `CONNECTION_BUFFER`  | 256     | Outbound queue size per socket            |
 * | `BCRYPT_COST`        | 12      | Password hashing cost (4..=31)            |
 *
 * Unlike optional integrations, a `DATABASE_URL` that is set but unreachable
 * is a fatal startup error: silently falling back to memory would lose data.
 */

use std::sync::Arc;

use thiserror::Error;

use crate::backend::realtime::{FanOutPolicy, DEFAULT_CONNECTION_BUFFER};
use crate::backend::store::{MemoryStore, PgStore, Store, StoreError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TOKEN_TTL_DAYS: u64 = 30;
pub const MAX_TOKEN_TTL_DAYS: u64 = 3650;

/// Signing key used by debug builds when `JWT_SECRET` is missing
const DEV_JWT_SECRET: &str = "circle-chat-dev-secret-change-me";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_days: u64,
    pub require_friendship: bool,
    pub connection_buffer: usize,
    pub bcrypt_cost: u32,
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, treating blank values as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut builder = Self::builder();

        if let Some(port) = get("SERVER_PORT") {
            builder = builder.port(parse("SERVER_PORT", &port)?);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(days) = get("TOKEN_TTL_DAYS") {
            builder = builder.token_ttl_days(parse("TOKEN_TTL_DAYS", &days)?);
        }
        if let Some(flag) = get("REQUIRE_FRIENDSHIP") {
            builder = builder.require_friendship(parse_bool("REQUIRE_FRIENDSHIP", &flag)?);
        }
        if let Some(size) = get("CONNECTION_BUFFER") {
            builder = builder.connection_buffer(parse("CONNECTION_BUFFER", &size)?);
        }
        if let Some(cost) = get("BCRYPT_COST") {
            builder = builder.bcrypt_cost(parse("BCRYPT_COST", &cost)?);
        }
        builder.build()
    }

    /// Fan-out behaviour derived from this configuration
    pub fn fanout_policy(&self) -> FanOutPolicy {
        FanOutPolicy {
            require_friendship: self.require_friendship,
            connection_buffer: self.connection_buffer,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: "0".to_string(),
            });
        }
        if !(1..=MAX_TOKEN_TTL_DAYS).contains(&self.token_ttl_days) {
            return Err(ConfigError::InvalidValue {
                key: "TOKEN_TTL_DAYS",
                value: self.token_ttl_days.to_string(),
            });
        }
        if self.connection_buffer == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CONNECTION_BUFFER",
                value: "0".to_string(),
            });
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::InvalidValue {
                key: "BCRYPT_COST",
                value: self.bcrypt_cost.to_string(),
            });
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    port: Option<u16>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    token_ttl_days: Option<u64>,
    require_friendship: bool,
    connection_buffer: Option<usize>,
    bcrypt_cost: Option<u32>,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn token_ttl_days(mut self, days: u64) -> Self {
        self.token_ttl_days = Some(days);
        self
    }

    pub fn require_friendship(mut self, required: bool) -> Self {
        self.require_friendship = required;
        self
    }

    pub fn connection_buffer(mut self, size: usize) -> Self {
        self.connection_buffer = Some(size);
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let jwt_secret = match self.jwt_secret {
            Some(secret) => secret,
            None if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set. Using the development secret.");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::MissingValue("JWT_SECRET")),
        };

        let config = ServerConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            jwt_secret,
            token_ttl_days: self.token_ttl_days.unwrap_or(DEFAULT_TOKEN_TTL_DAYS),
            require_friendship: self.require_friendship,
            connection_buffer: self.connection_buffer.unwrap_or(DEFAULT_CONNECTION_BUFFER),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Open the store selected by the configuration
///
/// - `DATABASE_URL` set: connect and migrate, failing hard on error
/// - unset: in-memory store, with a warning that nothing is persisted
pub async fn load_store(config: &ServerConfig) -> Result<Arc<dyn Store>, StoreError> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(PgStore::connect(url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store; data is lost on restart.");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
