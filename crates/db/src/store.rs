//! Storage traits consumed by the cache service and the seeder.

use crate::error::DbResult;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use trustcenter_core::{Resource, Row};

/// Read access to the content tables.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every row of the resource's backing table, in table order.
    async fn fetch_rows(&self, resource: Resource) -> DbResult<Vec<Row>>;

    /// Check database connectivity.
    async fn health_check(&self) -> DbResult<()>;
}

/// Sink for the CSV seeder: destructive table rebuild plus streaming load.
#[async_trait]
pub trait BulkLoader: Send + Sync {
    /// Drop `table` (CASCADE) if present, then run `create_sql`.
    async fn recreate_table(&self, table: &str, create_sql: &str) -> DbResult<()>;

    /// Stream the CSV file at `path` into `table`, scoped to `headers` in
    /// order. Returns the number of rows the server reports as copied.
    async fn copy_csv(&self, table: &str, headers: &[String], path: &Path) -> DbResult<u64>;

    /// Row count of `table`.
    async fn count_rows(&self, table: &str) -> DbResult<i64>;
}

/// A column as described by `information_schema.columns`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

/// A public table and its columns in ordinal order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
}
