//! Serializing flat records to disk.
//!
//! Two formats are supported:
//!
//! - [`OutputFormat::Array`] - one pretty-printed JSON array
//! - [`OutputFormat::Lines`] - newline-delimited JSON, one record per line
//!
//! The destination's parent directory must already exist; it is checked before
//! the file is created. Records are written in one pass with no retry, so a
//! failure mid-write can leave a truncated file behind.

pub mod batch;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{OutputError, OutputResult};
use crate::logs::log_success;

pub use batch::{fan_out, process_batch, BatchOptions};
pub use loader::{load_file, parse_records};

/// Layout of an output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A single pretty-printed JSON array.
    #[serde(alias = "json")]
    Array,
    /// Newline-delimited JSON.
    #[default]
    #[serde(alias = "jsonl", alias = "ndjson")]
    Lines,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "array" => Ok(Self::Array),
            "jsonl" | "ndjson" | "lines" => Ok(Self::Lines),
            other => Err(format!("unknown output format '{other}' (expected json or jsonl)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array => write!(f, "json"),
            Self::Lines => write!(f, "jsonl"),
        }
    }
}

/// Fail unless the directory that will hold `path` exists.
pub fn ensure_parent_dir(path: &Path) -> OutputResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => {
            Err(OutputError::MissingDirectory(dir.to_path_buf()))
        }
        _ => Ok(()),
    }
}

/// Serialize records into any writer.
///
/// Serialization failures surface as `io::Error`s of kind `InvalidData`.
pub fn write_records_to<W: Write, T: Serialize>(
    writer: &mut W,
    records: &[T],
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Array => {
            serde_json::to_writer_pretty(&mut *writer, records)?;
            writer.write_all(b"\n")?;
        }
        OutputFormat::Lines => {
            for record in records {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Serialize records into a string.
pub fn records_to_string<T: Serialize>(records: &[T], format: OutputFormat) -> OutputResult<String> {
    let mut out = String::new();
    match format {
        OutputFormat::Array => {
            out.push_str(&serde_json::to_string_pretty(records)?);
            out.push('\n');
        }
        OutputFormat::Lines => {
            for record in records {
                out.push_str(&serde_json::to_string(record)?);
                out.push('\n');
            }
        }
    }
    Ok(out)
}

/// Write records to `path`, replacing any existing file.
pub fn write_records<T: Serialize>(
    records: &[T],
    path: &Path,
    format: OutputFormat,
) -> OutputResult<()> {
    ensure_parent_dir(path)?;

    let write_err = |source: io::Error| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    write_records_to(&mut writer, records, format).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    log_success(format!(
        "Wrote {} records to {} ({})",
        records.len(),
        path.display(),
        format
    ));
    Ok(())
}
