//! Column type inference and DDL generation for CSV seeding.
//!
//! Types are inferred from the first data row only. Later rows are never
//! consulted, so a column whose first value is `42` becomes `INTEGER` even if
//! a later row holds `"n/a"`; the bulk load then fails for that file.

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

static TIMESTAMP_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").expect("timestamp regex is valid")
});

/// Postgres column type produced by inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SqlType {
    Text,
    TimestampTz,
    Boolean,
    Integer,
    Numeric,
    Jsonb,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::TimestampTz => "TIMESTAMPTZ",
            Self::Boolean => "BOOLEAN",
            Self::Integer => "INTEGER",
            Self::Numeric => "NUMERIC",
            Self::Jsonb => "JSONB",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Infer a column type from a single CSV value. First matching rule wins.
pub fn infer_type(value: &str) -> SqlType {
    if value.is_empty() {
        return SqlType::Text;
    }

    if TIMESTAMP_PREFIX.is_match(value) {
        return SqlType::TimestampTz;
    }

    let trimmed = value.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return SqlType::Jsonb;
    }

    let lowered = trimmed.to_ascii_lowercase();
    if lowered == "true" || lowered == "false" {
        return SqlType::Boolean;
    }

    if let Ok(num) = trimmed.parse::<f64>() {
        if num.is_finite() {
            if num.fract() == 0.0 && !value.contains('.') {
                return SqlType::Integer;
            }
            return SqlType::Numeric;
        }
    }

    SqlType::Text
}

/// A column definition derived from a CSV header and its first-row value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferredColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
}

impl InferredColumn {
    pub fn new(name: &str, first_value: &str) -> Self {
        Self {
            name: name.to_string(),
            sql_type: infer_type(first_value),
            is_primary_key: name.eq_ignore_ascii_case("id"),
        }
    }

    /// Render the column clause of a `CREATE TABLE` statement.
    pub fn definition(&self) -> String {
        let quoted = quote_ident(&self.name);

        // `id` is always a string key, whatever its first value looks like.
        if self.is_primary_key {
            return format!("{quoted} VARCHAR(255) PRIMARY KEY");
        }

        if self.name.to_ascii_lowercase().contains("categor") && self.sql_type == SqlType::Jsonb {
            return format!("{quoted} JSONB");
        }

        format!("{quoted} {}", self.sql_type)
    }
}

/// Infer one column per header. Missing first-row values infer as `TEXT`.
pub fn infer_columns<S: AsRef<str>>(headers: &[S], first_row: &[S]) -> Vec<InferredColumn> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let value = first_row.get(i).map(AsRef::as_ref).unwrap_or("");
            InferredColumn::new(header.as_ref(), value)
        })
        .collect()
}

/// Quote a Postgres identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Table name for a CSV file: the file stem with case preserved.
pub fn table_name_from_file(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_string)
}

pub fn create_table_sql(table: &str, columns: &[InferredColumn]) -> String {
    let body = columns
        .iter()
        .map(InferredColumn::definition)
        .collect::<Vec<_>>()
        .join(",\n  ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
        quote_ident(table),
        body
    )
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {} CASCADE;", quote_ident(table))
}

/// `COPY` statement scoped to the exact header list and order.
pub fn copy_from_stdin_sql<S: AsRef<str>>(table: &str, headers: &[S]) -> String {
    let columns = headers
        .iter()
        .map(|h| quote_ident(h.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "COPY {}({}) FROM STDIN CSV HEADER",
        quote_ident(table),
        columns
    )
}

pub fn count_rows_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}
