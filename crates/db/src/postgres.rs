//! PostgreSQL-backed content store and bulk loader.

use crate::error::{DbError, DbResult};
use crate::store::{BulkLoader, ColumnDescription, ContentStore, TableDescription};
use async_trait::async_trait;
use sqlx::postgres::{
    PgConnectOptions, PgPool, PgPoolCopyExt, PgPoolOptions, PgRow, PgSslMode as SqlxPgSslMode,
};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::path::Path;
use std::str::FromStr;
use time::{OffsetDateTime, PrimitiveDateTime};
use tokio::io::AsyncReadExt;
use trustcenter_core::config::PgSslMode;
use trustcenter_core::schema::{copy_from_stdin_sql, count_rows_sql, drop_table_sql, quote_ident};
use trustcenter_core::{Resource, Row, Value};

/// Bytes read from the CSV file per COPY data message.
const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Column types decoded natively. Anything else is cast to text, and
/// `numeric` is cast to `float8`.
const NATIVE_TYPES: &[&str] = &[
    "smallint",
    "integer",
    "bigint",
    "real",
    "double precision",
    "boolean",
    "text",
    "character varying",
    "character",
    "name",
    "timestamp with time zone",
    "timestamp without time zone",
    "json",
    "jsonb",
];

/// PostgreSQL-based content store.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store from a connection URL.
    pub async fn from_url(
        url: &str,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> DbResult<Self> {
        let opts = PgConnectOptions::from_str(url)?;
        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Create a store from individual connection parameters.
    #[allow(clippy::too_many_arguments)]
    pub async fn from_params(
        host: &str,
        port: u16,
        username: Option<&str>,
        password: Option<&str>,
        database: &str,
        ssl_mode: Option<PgSslMode>,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> DbResult<Self> {
        let mut opts = PgConnectOptions::new()
            .host(host)
            .port(port)
            .database(database);

        if let Some(user) = username {
            opts = opts.username(user);
        }

        if let Some(pass) = password {
            opts = opts.password(pass);
        }

        if let Some(mode) = ssl_mode {
            let sqlx_mode = match mode {
                PgSslMode::Disable => SqlxPgSslMode::Disable,
                PgSslMode::Prefer => SqlxPgSslMode::Prefer,
                PgSslMode::Require => SqlxPgSslMode::Require,
            };
            opts = opts.ssl_mode(sqlx_mode);
        }

        // Log connection info without password
        tracing::info!(
            host = host,
            port = port,
            database = database,
            username = username.unwrap_or("<none>"),
            ssl_mode = ?ssl_mode,
            "Connecting to PostgreSQL"
        );

        Self::connect(opts, max_connections, statement_timeout_ms).await
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn connect(
        mut opts: PgConnectOptions,
        max_connections: u32,
        statement_timeout_ms: Option<u64>,
    ) -> DbResult<Self> {
        if let Some(timeout_ms) = statement_timeout_ms {
            opts = opts.options([("statement_timeout", format!("{}ms", timeout_ms))]);
            tracing::info!("PostgreSQL statement_timeout set to {}ms", timeout_ms);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts)
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Columns of a public table in ordinal order. Empty if the table is missing.
    pub async fn table_columns(&self, table: &str) -> DbResult<Vec<ColumnDescription>> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT column_name::text, data_type::text, is_nullable::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable)| ColumnDescription {
                name,
                data_type,
                nullable: is_nullable == "YES",
            })
            .collect())
    }

    /// Every public table with its columns.
    pub async fn describe_tables(&self) -> DbResult<Vec<TableDescription>> {
        let tables: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut described = Vec::with_capacity(tables.len());
        for name in tables {
            let columns = self.table_columns(&name).await?;
            described.push(TableDescription { name, columns });
        }
        Ok(described)
    }
}

/// Build a select list that only yields natively decodable column types.
fn projection(columns: &[ColumnDescription]) -> String {
    columns
        .iter()
        .map(|column| {
            let quoted = quote_ident(&column.name);
            match column.data_type.as_str() {
                "numeric" => format!("{quoted}::float8 AS {quoted}"),
                t if NATIVE_TYPES.contains(&t) => quoted,
                _ => format!("{quoted}::text AS {quoted}"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn decode_row(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::with_capacity(row.len());
    for column in row.columns() {
        let value = decode_value(row, column.ordinal(), column.type_info().name())?;
        decoded.push(column.name(), value);
    }
    Ok(decoded)
}

fn decode_value(row: &PgRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "INT2" => Value::Integer(row.try_get::<i16, _>(idx)?.into()),
        "INT4" => Value::Integer(row.try_get::<i32, _>(idx)?.into()),
        "INT8" => Value::Integer(row.try_get::<i64, _>(idx)?),
        "FLOAT4" => Value::Numeric(row.try_get::<f32, _>(idx)?.into()),
        "FLOAT8" => Value::Numeric(row.try_get::<f64, _>(idx)?),
        "BOOL" => Value::Boolean(row.try_get::<bool, _>(idx)?),
        "TIMESTAMPTZ" => Value::Timestamp(row.try_get::<OffsetDateTime, _>(idx)?),
        "TIMESTAMP" => Value::Timestamp(row.try_get::<PrimitiveDateTime, _>(idx)?.assume_utc()),
        "JSON" | "JSONB" => Value::Json(row.try_get::<serde_json::Value, _>(idx)?),
        _ => Value::Text(row.try_get::<String, _>(idx)?),
    };
    Ok(value)
}

fn stream_error(table: &str, message: impl ToString) -> DbError {
    DbError::Stream {
        table: table.to_string(),
        message: message.to_string(),
    }
}

#[async_trait]
impl ContentStore for PostgresStore {
    async fn fetch_rows(&self, resource: Resource) -> DbResult<Vec<Row>> {
        let table = resource.table();
        let columns = self.table_columns(table).await?;

        // A missing table falls through to the plain select so the caller
        // sees Postgres' own "relation does not exist" error.
        let sql = if columns.is_empty() {
            resource.select_all_sql()
        } else {
            format!("SELECT {} FROM {}", projection(&columns), quote_ident(table))
        };

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        let decoded = rows
            .iter()
            .map(decode_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decoded)
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl BulkLoader for PostgresStore {
    async fn recreate_table(&self, table: &str, create_sql: &str) -> DbResult<()> {
        sqlx::query(&drop_table_sql(table))
            .execute(&self.pool)
            .await?;
        sqlx::query(create_sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn copy_csv(&self, table: &str, headers: &[String], path: &Path) -> DbResult<u64> {
        let statement = copy_from_stdin_sql(table, headers);
        let mut file = tokio::fs::File::open(path).await?;

        // The copy handle owns a pooled connection; it goes back to the pool
        // when the handle is finished, aborted or dropped.
        let mut copy = self.pool.copy_in_raw(&statement).await?;
        let mut buf = vec![0u8; COPY_CHUNK_SIZE];

        loop {
            let n = match file.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    if let Err(abort_err) = copy.abort(e.to_string()).await {
                        tracing::warn!(table = %table, error = %abort_err, "COPY abort failed");
                    }
                    return Err(stream_error(table, e));
                }
            };

            let sent = copy.send(&buf[..n]).await.map(|_| ());
            if let Err(e) = sent {
                if let Err(abort_err) = copy.abort(e.to_string()).await {
                    tracing::warn!(table = %table, error = %abort_err, "COPY abort failed");
                }
                return Err(stream_error(table, e));
            }
        }

        copy.finish().await.map_err(|e| stream_error(table, e))
    }

    async fn count_rows(&self, table: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(&count_rows_sql(table))
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str) -> ColumnDescription {
        ColumnDescription {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: true,
        }
    }

    #[test]
    fn test_projection_casts_non_native_types() {
        let columns = vec![
            column("id", "character varying"),
            column("responseTimeHours", "numeric"),
            column("birthday", "date"),
            column("isActive", "boolean"),
        ];
        assert_eq!(
            projection(&columns),
            "\"id\", \"responseTimeHours\"::float8 AS \"responseTimeHours\", \
             \"birthday\"::text AS \"birthday\", \"isActive\""
        );
    }
}
