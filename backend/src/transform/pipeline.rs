//! High-level conversion API: match documents in, record files out.
//!
//! Combines every step for one or many documents: reading and decoding the
//! source, traversal, record validation, the optional schema check, and the
//! single final write.
//!
//! # Example
//!
//! ```rust,ignore
//! use ballbyball::{convert_batch, ConvertOptions};
//! use std::path::{Path, PathBuf};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConvertOptions::from_env();
//!     let summary = convert_batch(
//!         &[PathBuf::from("matches/")],
//!         Path::new("deliveries.jsonl"),
//!         &options,
//!     ).await?;
//!
//!     println!("Converted {} records from {} files", summary.records, summary.files);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::FlatRecord;
use crate::output::{self, batch, OutputFormat};
use crate::parser::{json_files, MatchParser};
use crate::validation::validate_delivery_records;

/// Destination used when the caller names none.
pub const DEFAULT_OUTPUT: &str = "output.json";

/// Options for a conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Layout of the output file
    pub format: OutputFormat,

    /// Convert documents on a worker pool; cross-file order is then unspecified
    pub parallel: bool,

    /// Maximum concurrent documents when `parallel` is set
    pub max_workers: usize,

    /// Check every record against the embedded JSON schema before writing
    pub schema_check: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            parallel: true,
            max_workers: batch::default_workers(),
            schema_check: false,
        }
    }
}

impl ConvertOptions {
    /// Defaults overridden by `BALLBYBALL_*` environment variables.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(raw) = lookup("BALLBYBALL_FORMAT") {
            match raw.parse() {
                Ok(format) => options.format = format,
                Err(e) => log_warning(format!("Ignoring BALLBYBALL_FORMAT: {}", e)),
            }
        }
        if let Some(parallel) = env_flag(&lookup, "BALLBYBALL_PARALLEL") {
            options.parallel = parallel;
        }
        if let Some(raw) = lookup("BALLBYBALL_MAX_WORKERS") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => options.max_workers = n,
                _ => log_warning(format!("Ignoring BALLBYBALL_MAX_WORKERS: '{}'", raw)),
            }
        }
        if let Some(check) = env_flag(&lookup, "BALLBYBALL_SCHEMA_CHECK") {
            options.schema_check = check;
        }

        options
    }
}

fn env_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    let raw = lookup(key)?;
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            log_warning(format!("Ignoring {}: '{}' is not a boolean", key, raw));
            None
        }
    }
}

/// What a conversion run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Source documents converted
    pub files: usize,
    /// Records written
    pub records: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchSummary {
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Convert one match document file.
pub fn convert_file(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> PipelineResult<BatchSummary> {
    convert_file_with(&MatchParser::new(), input, output, options)
}

/// Convert one match document file with a configured parser.
pub fn convert_file_with(
    parser: &MatchParser,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> PipelineResult<BatchSummary> {
    let started_at = Utc::now();
    output::ensure_parent_dir(output)?;

    log_info(format!("Processing: {}", input.display()));
    let records = parse_one(parser, input)?;
    finish(&records, output, options)?;

    Ok(BatchSummary {
        files: 1,
        records: records.len(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Convert many documents into one output file.
///
/// Each input is either a document file or a directory whose `*.json` files
/// are all converted. Any failing document aborts the run and nothing is
/// written.
pub async fn convert_batch(
    inputs: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
) -> PipelineResult<BatchSummary> {
    convert_batch_with(Arc::new(MatchParser::new()), inputs, output, options).await
}

/// [`convert_batch`] with a configured parser shared by all workers.
pub async fn convert_batch_with(
    parser: Arc<MatchParser>,
    inputs: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
) -> PipelineResult<BatchSummary> {
    let started_at = Utc::now();
    output::ensure_parent_dir(output)?;

    let files = expand_inputs(inputs)?;
    if files.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let file_count = files.len();

    log_info(format!(
        "Converting {} match documents ({})",
        file_count,
        if options.parallel {
            format!("{} workers", options.max_workers)
        } else {
            "sequential".to_string()
        }
    ));

    let per_file = batch::fan_out(files, options.parallel, options.max_workers, move |path: &Path| {
        parse_one(&parser, path)
    })
    .await?;

    let records: Vec<FlatRecord> = per_file.into_iter().flatten().collect();
    finish(&records, output, options)?;

    Ok(BatchSummary {
        files: file_count,
        records: records.len(),
        started_at,
        finished_at: Utc::now(),
    })
}

/// Convert a document already held in memory and write its records.
///
/// Returns the number of records written.
pub fn write_document(
    document: Value,
    output: &Path,
    format: OutputFormat,
) -> PipelineResult<usize> {
    output::ensure_parent_dir(output)?;
    let records = MatchParser::new().parse_value(document)?;
    output::write_records(&records, output, format)?;
    Ok(records.len())
}

/// Files named directly, plus the `*.json` files of named directories.
fn expand_inputs(inputs: &[PathBuf]) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(json_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn parse_one(parser: &MatchParser, path: &Path) -> PipelineResult<Vec<FlatRecord>> {
    let records = parser
        .parse_file(path)
        .map_err(|source| PipelineError::Document {
            path: path.to_path_buf(),
            source,
        })?;
    log_info_indent(format!("{}: {} deliveries", path.display(), records.len()), 1);
    Ok(records)
}

fn finish(records: &[FlatRecord], output: &Path, options: &ConvertOptions) -> PipelineResult<()> {
    if options.schema_check {
        check_schema(records)?;
    }
    output::write_records(records, output, options.format)?;
    Ok(())
}

fn check_schema(records: &[FlatRecord]) -> PipelineResult<()> {
    log_info("Validating records against schema...");
    let values: Vec<Value> = records.iter().cloned().map(Value::Object).collect();
    validate_delivery_records(&values)
        .map_err(|(index, errors)| PipelineError::Schema { index, errors })?;
    log_success(format!("All {} records valid", records.len()));
    Ok(())
}
