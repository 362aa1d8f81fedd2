//! In-memory bulk loader that records what the seeder asks for.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use trustcenter_db::{BulkLoader, DbError, DbResult};

/// A table as the recording loader sees it.
#[allow(dead_code)]
#[derive(Clone, Debug, Default)]
pub struct RecordedTable {
    pub create_sql: String,
    pub headers: Vec<String>,
    pub rows: u64,
    pub recreated: usize,
}

#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingLoader {
    tables: Mutex<HashMap<String, RecordedTable>>,
    fail_copy: Mutex<HashSet<String>>,
}

#[allow(dead_code)]
impl RecordingLoader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every COPY into `table` fail with a stream error.
    pub fn fail_copy_for(&self, table: &str) {
        self.fail_copy.lock().unwrap().insert(table.to_string());
    }

    pub fn table(&self, name: &str) -> Option<RecordedTable> {
        self.tables.lock().unwrap().get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tables.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl BulkLoader for RecordingLoader {
    async fn recreate_table(&self, table: &str, create_sql: &str) -> DbResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let recreated = tables.get(table).map(|t| t.recreated).unwrap_or(0) + 1;
        tables.insert(
            table.to_string(),
            RecordedTable {
                create_sql: create_sql.to_string(),
                headers: Vec::new(),
                rows: 0,
                recreated,
            },
        );
        Ok(())
    }

    async fn copy_csv(&self, table: &str, headers: &[String], path: &Path) -> DbResult<u64> {
        if self.fail_copy.lock().unwrap().contains(table) {
            return Err(DbError::Stream {
                table: table.to_string(),
                message: "injected copy failure".to_string(),
            });
        }

        let rows = trustcenter_core::inspect_csv(path)?.data_rows;
        let mut tables = self.tables.lock().unwrap();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| DbError::Internal(format!("table {table} was never created")))?;
        entry.headers = headers.to_vec();
        entry.rows += rows;
        Ok(rows)
    }

    async fn count_rows(&self, table: &str) -> DbResult<i64> {
        let tables = self.tables.lock().unwrap();
        let entry = tables
            .get(table)
            .ok_or_else(|| DbError::Internal(format!("table {table} does not exist")))?;
        Ok(entry.rows as i64)
    }
}
