//! Loading previously written record files.
//!
//! A file is first read as one JSON array. When that fails, or the top-level
//! value is not an array, it is read as newline-delimited JSON instead; lines
//! that do not parse are skipped with a warning.

use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::{OutputError, OutputResult};
use crate::logs::log_warning;

/// Parse record-file content in either supported layout.
pub fn parse_records(content: &str) -> Vec<Value> {
    if let Ok(Value::Array(records)) = serde_json::from_str::<Value>(content) {
        return records;
    }

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => records.push(record),
            Err(e) => log_warning(format!("Skipping line {}: not a JSON record ({})", idx + 1, e)),
        }
    }
    records
}

/// Read every record from a JSON-array or JSON-lines file.
pub fn load_file<P: AsRef<Path>>(path: P) -> OutputResult<Vec<Value>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_records(&content))
}
