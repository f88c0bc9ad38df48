//! Ballbyball CLI - Flatten cricket match documents into delivery records
//!
//! # Commands
//!
//! ```bash
//! ballbyball convert match.json               # One document → output.json
//! ballbyball convert match.json out.json -f json
//! ballbyball batch matches/ -o all.jsonl      # Many documents → one file
//! ballbyball merge a.jsonl b.json -o all.jsonl
//! ballbyball validate all.jsonl               # Check records against the schema
//! ```
//!
//! Defaults come from `BALLBYBALL_*` environment variables (a `.env` file is
//! loaded first); flags override them.

use ballbyball::{
    convert_batch, convert_file, load_file, process_batch, validate_delivery_record,
    BatchOptions, BatchSummary, ConvertOptions, OutputFormat, DEFAULT_OUTPUT,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ballbyball")]
#[command(about = "Flatten ball-by-ball cricket match documents into delivery records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one match document
    Convert {
        /// Input match document (JSON)
        input: PathBuf,

        /// Output file
        #[arg(default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Output format: json (array) or jsonl (one record per line)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Validate every record against the JSON schema before writing
        #[arg(long)]
        schema_check: bool,
    },

    /// Convert many match documents (files or directories) into one output
    Batch {
        /// Input documents or directories of *.json documents
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Process files one by one, keeping input order
        #[arg(long)]
        sequential: bool,

        /// Maximum concurrent documents
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output format: json or jsonl
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Validate every record against the JSON schema before writing
        #[arg(long)]
        schema_check: bool,
    },

    /// Concatenate existing record files (JSON array or JSON lines)
    Merge {
        /// Record files to merge
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Load files one by one, keeping input order
        #[arg(long)]
        sequential: bool,

        /// Maximum concurrent files
        #[arg(short, long)]
        workers: Option<usize>,

        /// Output format: json or jsonl
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Validate a record file against the delivery record schema
    Validate {
        /// Record file (JSON array or JSON lines)
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut options = ConvertOptions::from_env();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            schema_check,
        } => {
            apply_overrides(&mut options, format, None, None, schema_check);
            cmd_convert(&input, &output, &options)
        }

        Commands::Batch {
            inputs,
            output,
            sequential,
            workers,
            format,
            schema_check,
        } => {
            apply_overrides(&mut options, format, Some(sequential), workers, schema_check);
            cmd_batch(&inputs, &output, &options).await
        }

        Commands::Merge {
            inputs,
            output,
            sequential,
            workers,
            format,
        } => {
            apply_overrides(&mut options, format, Some(sequential), workers, false);
            cmd_merge(&inputs, &output, &options).await
        }

        Commands::Validate { input } => cmd_validate(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn apply_overrides(
    options: &mut ConvertOptions,
    format: Option<OutputFormat>,
    sequential: Option<bool>,
    workers: Option<usize>,
    schema_check: bool,
) {
    if let Some(format) = format {
        options.format = format;
    }
    if sequential == Some(true) {
        options.parallel = false;
    }
    if let Some(workers) = workers {
        options.max_workers = workers.max(1);
    }
    if schema_check {
        options.schema_check = true;
    }
}

fn cmd_convert(
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = convert_file(input, output, options)?;
    print_summary(&summary);
    Ok(())
}

async fn cmd_batch(
    inputs: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = convert_batch(inputs, output, options).await?;
    print_summary(&summary);
    Ok(())
}

async fn cmd_merge(
    inputs: &[PathBuf],
    output: &Path,
    options: &ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let batch = BatchOptions {
        parallel: options.parallel,
        max_workers: options.max_workers,
        format: options.format,
    };
    let count = process_batch(inputs, output, &batch).await?;
    eprintln!("Merged {} records from {} files", count, inputs.len());
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Validating: {}", input.display());

    let records = load_file(input)?;

    let mut valid = 0;
    let mut invalid = 0;

    for (i, record) in records.iter().enumerate() {
        match validate_delivery_record(record) {
            Ok(()) => valid += 1,
            Err(errors) => {
                invalid += 1;
                if invalid <= 5 {
                    eprintln!("\nRecord {} invalid:", i);
                    for err in errors.iter().take(3) {
                        eprintln!("   - {}", err);
                    }
                }
            }
        }
    }

    eprintln!("\nResults: {} valid, {} invalid", valid, invalid);

    if invalid > 0 {
        return Err(format!("{} of {} records failed validation", invalid, records.len()).into());
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    eprintln!(
        "Converted {} records from {} file(s) in {} ms",
        summary.records,
        summary.files,
        summary.elapsed().num_milliseconds()
    );
}
