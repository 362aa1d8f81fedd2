//! Rebuild content tables from a directory of CSV files.
//!
//! Seeding is a full reseed, not a migration: every table named by a CSV file
//! is dropped (CASCADE), recreated from inferred column types and bulk loaded.
//! Files are processed one at a time; a failing file is recorded and the batch
//! moves on.

use crate::error::{DbError, DbResult};
use crate::store::BulkLoader;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use trustcenter_core::schema::{create_table_sql, table_name_from_file};
use trustcenter_core::{CsvPreview, infer_columns, inspect_csv};

/// Outcome of seeding a single CSV file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileOutcome {
    #[serde(rename_all = "camelCase")]
    Imported { rows_imported: u64 },
    Failed { error: String },
}

impl FileOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, Self::Imported { .. })
    }
}

/// Per-file outcomes keyed by file name.
pub type SeedReport = BTreeMap<String, FileOutcome>;

/// CSV directory seeder.
#[derive(Clone)]
pub struct Seeder {
    loader: Arc<dyn BulkLoader>,
}

impl Seeder {
    pub fn new(loader: Arc<dyn BulkLoader>) -> Self {
        Self { loader }
    }

    /// Seed every `.csv` file in `dir`, in file name order.
    ///
    /// A missing directory or a directory without CSV files is a no-op.
    pub async fn seed(&self, dir: &Path) -> DbResult<SeedReport> {
        let mut report = SeedReport::new();

        if !dir.is_dir() {
            tracing::info!(dir = %dir.display(), "Data folder does not exist, nothing to seed");
            return Ok(report);
        }

        let csv_files = list_csv_files(dir)?;
        if csv_files.is_empty() {
            tracing::info!(dir = %dir.display(), "No CSV files found, nothing to seed");
            return Ok(report);
        }

        tracing::info!(dir = %dir.display(), files = csv_files.len(), "Starting seed");

        for path in csv_files {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            let outcome = match self.seed_file(&path).await {
                Ok(rows_imported) => FileOutcome::Imported { rows_imported },
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Failed to seed CSV file");
                    FileOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            report.insert(file_name, outcome);
        }

        let imported = report.values().filter(|o| o.is_imported()).count();
        tracing::info!(
            imported = imported,
            failed = report.len() - imported,
            "Seeding complete"
        );

        Ok(report)
    }

    /// Rebuild and load the table for one CSV file. Returns the verified row count.
    pub async fn seed_file(&self, path: &Path) -> DbResult<u64> {
        let table = table_name_from_file(path).ok_or_else(|| {
            DbError::Ingestion(trustcenter_core::Error::Csv(format!(
                "cannot derive a table name from {}",
                path.display()
            )))
        })?;

        let preview = inspect(path.to_path_buf()).await?;
        let columns = infer_columns(&preview.headers, &preview.first_row);
        let create_sql = create_table_sql(&table, &columns);
        tracing::debug!(table = %table, sql = %create_sql, "Generated table definition");

        self.loader.recreate_table(&table, &create_sql).await?;

        tracing::info!(table = %table, "Importing data");
        let copied = self
            .loader
            .copy_csv(&table, &preview.headers, path)
            .await?;

        let count = self.loader.count_rows(&table).await?;
        tracing::info!(table = %table, copied = copied, rows = count, "Imported rows");

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

async fn inspect(path: PathBuf) -> DbResult<CsvPreview> {
    let preview = tokio::task::spawn_blocking(move || inspect_csv(&path))
        .await
        .map_err(|e| DbError::Internal(format!("CSV inspection task failed: {e}")))??;
    Ok(preview)
}

fn list_csv_files(dir: &Path) -> DbResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}
