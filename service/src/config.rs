//! Configuration management for the reservation service.
//!
//! Loads configuration from environment variables with sensible defaults.

use reservation_core::DEFAULT_PACING_INTERVAL;
use reservation_postgres::PostgresConfig;
use reservation_redis::RedisConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Names stored at startup when `SEED_NAMES` is unset.
pub const DEFAULT_SEED_NAMES: [&str; 8] = [
    "Josh", "Madhura", "Mark", "Olga", "Spencer", "Ria", "Stéphane", "Violetta",
];

/// Errors raised while reading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `RESERVATION_STORE` names no known backend
    #[error("Unknown reservation store {0:?} (expected memory, postgres or redis)")]
    UnknownStore(String),
}

/// Which persistence backend serves reservations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, lost on restart
    #[default]
    Memory,
    /// `PostgreSQL` table with `BIGSERIAL` ids
    Postgres,
    /// Redis hash of JSON documents with UUID ids
    Redis,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::UnknownStore(s.to_string())),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
            Self::Redis => "redis",
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Selected persistence backend
    pub store: StoreBackend,
    /// `PostgreSQL` configuration
    pub postgres: PostgresConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Application server configuration
    pub server: ServerConfig,
    /// Greeting stream configuration
    pub greeting: GreetingConfig,
    /// Names written by the startup seeder
    pub seed_names: Vec<String>,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Whether to expose Prometheus metrics
    pub metrics_enabled: bool,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Greeting stream configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GreetingConfig {
    /// Delay between greetings in milliseconds
    pub interval_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable numbers and flags fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStore`] if `RESERVATION_STORE` is set to
    /// an unsupported backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let postgres_defaults = PostgresConfig::default();
        let redis_defaults = RedisConfig::default();

        Ok(Self {
            store: lookup("RESERVATION_STORE")
                .map(|s| s.parse::<StoreBackend>())
                .transpose()?
                .unwrap_or_default(),
            postgres: PostgresConfig {
                url: lookup("DATABASE_URL").unwrap_or(postgres_defaults.url),
                max_connections: parse_var(&lookup, "DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(postgres_defaults.max_connections),
                min_connections: parse_var(&lookup, "DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(postgres_defaults.min_connections),
                connect_timeout: parse_var(&lookup, "DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(postgres_defaults.connect_timeout),
            },
            redis: RedisConfig {
                url: lookup("REDIS_URL").unwrap_or(redis_defaults.url),
                key_prefix: lookup("REDIS_KEY_PREFIX").unwrap_or(redis_defaults.key_prefix),
            },
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_var(&lookup, "PORT").unwrap_or(8080),
                metrics_enabled: parse_var(&lookup, "METRICS_ENABLED").unwrap_or(false),
                metrics_host: lookup("METRICS_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                metrics_port: parse_var(&lookup, "METRICS_PORT").unwrap_or(9090),
                shutdown_timeout: parse_var(&lookup, "SHUTDOWN_TIMEOUT").unwrap_or(30),
            },
            greeting: GreetingConfig {
                interval_ms: parse_var(&lookup, "GREETING_INTERVAL_MS").unwrap_or(
                    u64::try_from(DEFAULT_PACING_INTERVAL.as_millis()).unwrap_or(1000),
                ),
            },
            seed_names: lookup("SEED_NAMES").map_or_else(
                || DEFAULT_SEED_NAMES.iter().map(ToString::to_string).collect(),
                |s| split_names(&s),
            ),
        })
    }

    /// Address the HTTP server binds to.
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Address the Prometheus exporter binds to.
    #[must_use]
    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.server.metrics_host, self.server.metrics_port)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|s| s.trim().parse().ok())
}

/// Split a comma-separated list, dropping blank entries.
///
/// Names are otherwise kept verbatim so lowercase entries still reach the
/// validating pipeline.
fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}
