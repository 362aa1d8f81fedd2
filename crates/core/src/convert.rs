//! Relay-style JSON export to CSV conversion.
//!
//! Content exports arrive shaped as `{"data": {"<key>": {"edges": [{"node": {..}}]}}}`.
//! Each node becomes one CSV row; headers come from the first node's keys.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of converting one relay document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedCsv {
    pub csv: String,
    pub record_count: usize,
    pub headers: Vec<String>,
}

/// Per-file outcome of a directory conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ConvertOutcome {
    #[serde(rename_all = "camelCase")]
    Converted {
        csv_filename: String,
        record_count: usize,
        headers: Vec<String>,
    },
    Failed {
        error: String,
    },
}

/// Convert a relay JSON document to CSV text.
pub fn convert_relay_json(input: &str) -> Result<ConvertedCsv> {
    let document: JsonValue = serde_json::from_str(input)?;

    let data = document
        .get("data")
        .and_then(JsonValue::as_object)
        .filter(|data| !data.is_empty())
        .ok_or_else(|| Error::Convert("no data found".to_string()))?;

    // Only the first top-level key is exported.
    let (_, connection) = data
        .iter()
        .next()
        .ok_or_else(|| Error::Convert("no data found".to_string()))?;

    let edges = connection
        .get("edges")
        .and_then(JsonValue::as_array)
        .filter(|edges| !edges.is_empty())
        .ok_or_else(|| Error::Convert("no edges found".to_string()))?;

    let nodes: Vec<&JsonValue> = edges
        .iter()
        .map(|edge| edge.get("node").unwrap_or(&JsonValue::Null))
        .collect();

    let headers: Vec<String> = nodes[0]
        .as_object()
        .ok_or_else(|| Error::Convert("first edge has no node object".to_string()))?
        .keys()
        .cloned()
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;
    for node in &nodes {
        let record: Vec<String> = headers
            .iter()
            .map(|field| cell_text(node.get(field)))
            .collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Convert(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| Error::Convert(e.to_string()))?;

    Ok(ConvertedCsv {
        csv,
        record_count: nodes.len(),
        headers,
    })
}

fn cell_text(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Convert every `.json` file in `dir` to a sibling `.csv` file.
///
/// Failures are recorded per file and do not stop the batch. A missing
/// directory, or one without JSON files, yields an empty map.
pub fn convert_directory(dir: &Path) -> Result<BTreeMap<String, ConvertOutcome>> {
    let mut results = BTreeMap::new();

    if !dir.is_dir() {
        tracing::info!(dir = %dir.display(), "Data folder not found");
        return Ok(results);
    }

    let mut json_files: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    json_files.sort();

    if json_files.is_empty() {
        tracing::info!(dir = %dir.display(), "No JSON files found");
        return Ok(results);
    }

    for path in json_files {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let outcome = match convert_file(&path) {
            Ok((csv_filename, converted)) => {
                tracing::info!(
                    file = %file_name,
                    csv = %csv_filename,
                    records = converted.record_count,
                    "Converted JSON export to CSV"
                );
                ConvertOutcome::Converted {
                    csv_filename,
                    record_count: converted.record_count,
                    headers: converted.headers,
                }
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Skipped JSON file");
                ConvertOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        results.insert(file_name, outcome);
    }

    Ok(results)
}

fn convert_file(path: &Path) -> Result<(String, ConvertedCsv)> {
    let input = std::fs::read_to_string(path)?;
    let converted = convert_relay_json(&input)?;
    let csv_path = path.with_extension("csv");
    std::fs::write(&csv_path, &converted.csv)?;
    let csv_filename = csv_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((csv_filename, converted))
}
