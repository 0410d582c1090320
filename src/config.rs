//! Gateway configuration loaded from environment variables.

use eyre::WrapErr;
use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "postgres://postgres@localhost:5432/clinical_trials";

/// Parses an environment variable, falling back to `default` when it is unset
/// or does not parse.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// PostgreSQL connection pool configuration.
///
/// # Environment Variables
///
/// - `DATABASE_URL` - Postgres connection string (default: `postgres://postgres@localhost:5432/clinical_trials`)
/// - `DB_MAX_CONNECTIONS` - Maximum pooled connections (default: `10`)
/// - `DB_MIN_CONNECTIONS` - Idle connections kept open (default: `0`)
/// - `DB_ACQUIRE_TIMEOUT_MS` - Pool checkout timeout (default: `5000`)
/// - `DB_QUERY_TIMEOUT_MS` - Per-query timeout (default: `10000`)
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// Postgres connection string, credentials included
    pub url: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long a request waits for a free connection
    pub acquire_timeout: Duration,
    /// Upper bound on a single query, checkout included
    pub query_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.into(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_millis(5_000),
            query_timeout: Duration::from_millis(10_000),
        }
    }
}

impl DatabaseConfig {
    /// Loads database configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10u32).max(1),
            min_connections: env_or("DB_MIN_CONNECTIONS", 0u32),
            acquire_timeout: Duration::from_millis(env_or("DB_ACQUIRE_TIMEOUT_MS", 5_000)),
            query_timeout: Duration::from_millis(env_or("DB_QUERY_TIMEOUT_MS", 10_000)),
        }
    }

    /// `host:port/database` of the configured server, suitable for logging.
    /// Credentials and connection parameters are never included.
    pub fn display_target(&self) -> String {
        match PgConnectOptions::from_str(&self.url) {
            Ok(options) => format!(
                "{}:{}/{}",
                options.get_host(),
                options.get_port(),
                options.get_database().unwrap_or_default()
            ),
            Err(_) => "<invalid DATABASE_URL>".to_string(),
        }
    }
}

/// Server configuration.
///
/// Load from environment with [`Config::from_env`], or use [`Config::default`]
/// for development defaults.
///
/// # Environment Variables
///
/// - `LISTEN_ADDR` - HTTP server bind address (default: `0.0.0.0:8080`)
/// - `REQUEST_TIMEOUT_MS` - HTTP request timeout in milliseconds (default: `30000`)
///
/// See [`DatabaseConfig`] for database-specific environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub request_timeout_ms: u64,
    pub database: DatabaseConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout_ms: 30_000,
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but is not a socket address.
    pub fn from_env() -> eyre::Result<Self> {
        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr
                .parse()
                .wrap_err_with(|| format!("Invalid LISTEN_ADDR: {addr}"))?,
            Err(_) => Config::default().listen_addr,
        };

        Ok(Self {
            listen_addr,
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            database: DatabaseConfig::from_env(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
