//! CSV inspection ahead of a bulk load.

use crate::error::{Error, Result};
use csv::{ReaderBuilder, Trim};
use std::io::Read;
use std::path::Path;

/// Header row, first data row and data row count of a CSV file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvPreview {
    pub headers: Vec<String>,
    pub first_row: Vec<String>,
    pub data_rows: u64,
}

/// Parse a CSV file with a header row.
///
/// The whole file is parsed so that a malformed record anywhere fails the
/// inspection. Values are trimmed and blank lines skipped. A file without
/// any data row is an error.
pub fn inspect_csv(path: &Path) -> Result<CsvPreview> {
    let file = std::fs::File::open(path)?;
    let preview = inspect_reader(file)?;
    if preview.data_rows == 0 {
        return Err(Error::EmptyCsv(path.to_path_buf()));
    }
    tracing::debug!(
        path = %path.display(),
        headers = ?preview.headers,
        first_row = ?preview.first_row,
        "Parsed CSV headers and first row"
    );
    Ok(preview)
}

/// Parse CSV from any reader. An empty data section yields `data_rows == 0`.
pub fn inspect_reader<R: Read>(reader: R) -> Result<CsvPreview> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut first_row = Vec::new();
    let mut data_rows = 0u64;
    for record in rdr.records() {
        let record = record?;
        if data_rows == 0 {
            first_row = record.iter().map(str::to_string).collect();
        }
        data_rows += 1;
    }

    Ok(CsvPreview {
        headers,
        first_row,
        data_rows,
    })
}
