//! Database layer for the trust center content service.
//!
//! This crate provides:
//! - The `ContentStore` trait read by the cache service
//! - The `BulkLoader` trait fed by the CSV seeder
//! - A PostgreSQL implementation of both, with streaming `COPY` loads
//! - The directory seeder that rebuilds tables from CSV files

pub mod error;
pub mod postgres;
pub mod seed;
pub mod store;

pub use error::{DbError, DbResult};
pub use postgres::PostgresStore;
pub use seed::{FileOutcome, SeedReport, Seeder};
pub use store::{BulkLoader, ColumnDescription, ContentStore, TableDescription};

use std::sync::Arc;
use trustcenter_core::config::DatabaseConfig;

/// Create a PostgreSQL store from configuration.
pub async fn from_config(config: &DatabaseConfig) -> DbResult<Arc<PostgresStore>> {
    config.validate().map_err(DbError::Config)?;

    let store = if let Some(url) = &config.url {
        // URL takes precedence over individual fields
        tracing::info!("Connecting to PostgreSQL using connection URL");
        PostgresStore::from_url(url, config.max_connections, config.statement_timeout_ms).await?
    } else if let (Some(host), Some(database)) = (config.host.as_ref(), config.database.as_ref()) {
        PostgresStore::from_params(
            host,
            config.port,
            config.username.as_deref(),
            config.password.as_deref(),
            database,
            config.ssl_mode,
            config.max_connections,
            config.statement_timeout_ms,
        )
        .await?
    } else {
        return Err(DbError::Config(
            "database config requires either 'url' or 'host' + 'database'".to_string(),
        ));
    };

    Ok(Arc::new(store))
}
