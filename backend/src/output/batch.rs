//! Multi-file processing with an optional worker pool.
//!
//! Each file is handled by an independent blocking task; results are collected
//! in memory and the destination is written once, after every input finished.
//! In parallel mode results are appended in completion order, so cross-file
//! ordering is only stable when `parallel` is off.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinError;

use super::{loader, write_records, OutputFormat};
use crate::error::{OutputError, OutputResult};
use crate::logs::{log_info, log_info_indent};

/// How a batch of files is processed and written.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub parallel: bool,
    /// Upper bound on concurrent tasks when `parallel` is set.
    pub max_workers: usize,
    pub format: OutputFormat,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            max_workers: default_workers(),
            format: OutputFormat::default(),
        }
    }
}

/// Number of workers to use when none is configured.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Run `job` once per path and collect the results.
///
/// Sequential mode runs on the calling task and keeps input order. Parallel
/// mode runs at most `workers` jobs at once on the blocking pool and collects
/// them as they complete. The first error aborts the batch.
pub async fn fan_out<T, E, F>(
    paths: Vec<PathBuf>,
    parallel: bool,
    workers: usize,
    job: F,
) -> Result<Vec<T>, E>
where
    T: Send + 'static,
    E: From<JoinError> + Send + 'static,
    F: Fn(&Path) -> Result<T, E> + Send + Sync + 'static,
{
    if !parallel || paths.len() < 2 {
        return paths.iter().map(|path| job(path)).collect();
    }

    let job = Arc::new(job);
    let mut tasks = stream::iter(paths)
        .map(|path| {
            let job = Arc::clone(&job);
            tokio::task::spawn_blocking(move || job(&path))
        })
        .buffer_unordered(workers.max(1));

    let mut results = Vec::new();
    while let Some(joined) = tasks.next().await {
        results.push(joined??);
    }
    Ok(results)
}

/// Load several record files, concatenate them, and write one output file.
///
/// Returns the number of records written.
pub async fn process_batch(
    inputs: &[PathBuf],
    output: &Path,
    options: &BatchOptions,
) -> OutputResult<usize> {
    super::ensure_parent_dir(output)?;

    log_info(format!(
        "Loading {} record files ({})",
        inputs.len(),
        if options.parallel { "parallel" } else { "sequential" }
    ));

    let loaded = fan_out(
        inputs.to_vec(),
        options.parallel,
        options.max_workers,
        |path: &Path| {
            let records = loader::load_file(path)?;
            log_info_indent(format!("{}: {} records", path.display(), records.len()), 1);
            Ok::<_, OutputError>(records)
        },
    )
    .await?;

    let records: Vec<Value> = loaded.into_iter().flatten().collect();
    write_records(&records, output, options.format)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_inputs(dir: &Path) -> Vec<PathBuf> {
        let a = dir.join("a.jsonl");
        let b = dir.join("b.json");
        let c = dir.join("c.jsonl");
        fs::write(&a, "{\"file\":\"a\",\"n\":1}\n{\"file\":\"a\",\"n\":2}\n").unwrap();
        fs::write(&b, r#"[{"file":"b","n":1}]"#).unwrap();
        fs::write(&c, "{\"file\":\"c\",\"n\":1}\nnot json\n{\"file\":\"c\",\"n\":2}\n").unwrap();
        vec![a, b, c]
    }

    #[tokio::test]
    async fn test_sequential_preserves_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        let output = dir.path().join("merged.jsonl");
        let options = BatchOptions { parallel: false, max_workers: 1, format: OutputFormat::Lines };

        let count = process_batch(&inputs, &output, &options).await.unwrap();
        assert_eq!(count, 5);

        let merged = loader::load_file(&output).unwrap();
        let files: Vec<&str> = merged.iter().map(|r| r["file"].as_str().unwrap()).collect();
        assert_eq!(files, vec!["a", "a", "b", "c", "c"]);
    }

    #[tokio::test]
    async fn test_parallel_keeps_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        let output = dir.path().join("merged.json");
        let options = BatchOptions { parallel: true, max_workers: 3, format: OutputFormat::Array };

        let count = process_batch(&inputs, &output, &options).await.unwrap();
        assert_eq!(count, 5);

        let merged: Vec<Value> = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        let mut keys: Vec<String> = merged
            .iter()
            .map(|r| format!("{}{}", r["file"].as_str().unwrap(), r["n"]))
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["a1", "a2", "b1", "c1", "c2"]);
    }

    #[tokio::test]
    async fn test_missing_input_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = write_inputs(dir.path());
        inputs.push(dir.path().join("missing.jsonl"));
        let output = dir.path().join("merged.jsonl");
        let options = BatchOptions { parallel: true, max_workers: 2, format: OutputFormat::Lines };

        let err = process_batch(&inputs, &output, &options).await.unwrap_err();
        assert!(matches!(err, OutputError::Read { .. }));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_missing_output_directory_checked_first() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        let output = dir.path().join("nope").join("merged.jsonl");

        let err = process_batch(&inputs, &output, &BatchOptions::default()).await.unwrap_err();
        assert!(matches!(err, OutputError::MissingDirectory(_)));
    }

    #[tokio::test]
    async fn test_fan_out_sequential_order() {
        let paths: Vec<PathBuf> = (0..5).map(|i| PathBuf::from(format!("{i}.json"))).collect();
        let names: Result<Vec<String>, OutputError> = fan_out(paths, false, 4, |p: &Path| {
            Ok(p.display().to_string())
        })
        .await;
        assert_eq!(names.unwrap(), vec!["0.json", "1.json", "2.json", "3.json", "4.json"]);
    }
}
