//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Origins allowed by CORS. Empty disables the CORS layer.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Content database configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL. Takes precedence over the individual fields.
    pub url: Option<String>,
    /// Database host.
    #[serde(default = "default_db_host")]
    pub host: Option<String>,
    /// Database port.
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Database username.
    #[serde(default = "default_db_username")]
    pub username: Option<String>,
    /// Database password.
    /// WARNING: Prefer TRUSTCENTER_DATABASE__PASSWORD over storing it in config.
    #[serde(default = "default_db_password")]
    pub password: Option<String>,
    /// Database name.
    #[serde(default = "default_db_name")]
    pub database: Option<String>,
    /// SSL mode for connections.
    pub ssl_mode: Option<PgSslMode>,
    /// Maximum connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Statement timeout in milliseconds. Postgres cancels queries that
    /// run longer. Unset means no server-side timeout.
    pub statement_timeout_ms: Option<u64>,
}

fn default_db_host() -> Option<String> {
    Some("localhost".to_string())
}

fn default_db_port() -> u16 {
    5432
}

fn default_db_username() -> Option<String> {
    Some("root".to_string())
}

fn default_db_password() -> Option<String> {
    Some("root".to_string())
}

fn default_db_name() -> Option<String> {
    Some("test_db".to_string())
}

fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: default_db_host(),
            port: default_db_port(),
            username: default_db_username(),
            password: default_db_password(),
            database: default_db_name(),
            ssl_mode: None,
            max_connections: default_max_connections(),
            statement_timeout_ms: None,
        }
    }
}

impl DatabaseConfig {
    /// Validate database configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("database.max_connections must be greater than 0".to_string());
        }
        match (self.url.as_ref(), self.host.as_ref(), self.database.as_ref()) {
            (Some(_), _, _) => Ok(()),
            (None, Some(_), Some(_)) => Ok(()),
            (None, None, _) => {
                Err("database config requires either 'url' or 'host' + 'database'".to_string())
            }
            (None, Some(_), None) => {
                Err("database config requires 'database' when using individual fields".to_string())
            }
        }
    }
}

/// Read-through cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time-to-live for every cached resource, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
    /// How often expired entries are purged in the background, in seconds.
    #[serde(default = "default_cache_check_period_secs")]
    pub check_period_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_cache_check_period_secs() -> u64 {
    120
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            check_period_secs: default_cache_check_period_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Background purge interval. A zero period falls back to the default
    /// (tokio::time::interval panics on zero).
    pub fn check_period(&self) -> Duration {
        if self.check_period_secs == 0 {
            tracing::warn!(
                "cache.check_period_secs is 0, using default of {} seconds",
                default_cache_check_period_secs()
            );
            Duration::from_secs(default_cache_check_period_secs())
        } else {
            Duration::from_secs(self.check_period_secs)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_secs == 0 {
            return Err("cache.ttl_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// CSV seeding configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Directory holding one CSV file per table.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Metrics and CORS are disabled.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                cors_origins: Vec::new(),
                metrics_enabled: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate every section, returning the first error.
    pub fn validate(&self) -> Result<(), String> {
        self.database.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
