//! Database layer error types.

use std::sync::Arc;
use thiserror::Error;
use trustcenter_core::Resource;

/// Content database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading a resource failed. The source is shared because coalesced
    /// callers all observe the same failure.
    #[error("failed to retrieve {resource}: {source}")]
    Retrieval {
        resource: Resource,
        #[source]
        source: Arc<DbError>,
    },

    #[error("ingestion error: {0}")]
    Ingestion(#[from] trustcenter_core::Error),

    #[error("bulk load of {table} failed: {message}")]
    Stream { table: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for database operations.
pub type DbResult<T> = std::result::Result<T, DbError>;
