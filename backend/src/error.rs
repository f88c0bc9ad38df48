//! Error types for the ballbyball conversion pipeline.
//!
//! Each layer owns one error enum:
//!
//! - [`SourceError`] - Unreadable or structurally broken match documents
//! - [`InvariantError`] - Data-integrity violations found while building records
//! - [`ParseError`] - Either of the above, for one document
//! - [`OutputError`] - Reading record files and writing output
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Source Document Errors
// =============================================================================

/// Structural problems with a source match document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read the document from disk.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON, or a required key is absent.
    #[error("Malformed match document: {0}")]
    Json(#[from] serde_json::Error),

    /// A required key is present but carries no usable data.
    #[error("Missing required key: {0}")]
    MissingKey(String),

    /// A key holds a value outside its allowed domain.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// An innings names a batting team that did not play the match.
    #[error("Batting team '{team}' does not match the match teams {teams:?}")]
    UnknownTeam { team: String, teams: Vec<String> },
}

// =============================================================================
// Invariant Violations
// =============================================================================

/// Data-integrity violations detected during traversal or record validation.
#[derive(Debug, Error)]
pub enum InvariantError {
    /// More legal deliveries in one over than the match allows.
    #[error("Over {over} has more than {limit} legal deliveries")]
    OverOverflow { over: u32, limit: u32 },

    /// Required fields absent from a flat record.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A required field holds the wrong kind of value.
    #[error("Field '{field}' must be {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    /// runs_total disagrees with its components.
    #[error("runs_total {total} != runs_batter {batter} + runs_extras {extras}")]
    RunsMismatch { batter: i64, extras: i64, total: i64 },

    /// ball_number outside the legal-ball slots of an over.
    #[error("ball_number {ball} is outside 1..={balls_per_over}")]
    BallOutOfRange { ball: i64, balls_per_over: i64 },

    #[error("over_number must be >= 0, got {0}")]
    NegativeOver(i64),

    #[error("innings_number must be >= 1, got {0}")]
    InvalidInnings(i64),

    /// A player identifier is the empty string.
    #[error("Field '{0}' must not be empty")]
    EmptyField(String),
}

// =============================================================================
// Document Parse Errors
// =============================================================================

/// Everything that can abort the conversion of a single document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Invariant(#[from] InvariantError),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while loading record files or writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The destination's parent directory is absent.
    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Failed to read a record file.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the destination file.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A batch worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A source document failed to convert.
    #[error("{}: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Parse error without file context (in-memory documents).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// A produced record does not satisfy the flat record schema.
    #[error("Record {index} failed schema validation: {}", .errors.join("; "))]
    Schema { index: usize, errors: Vec<String> },

    /// A batch worker panicked or was cancelled.
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// No input files were given.
    #[error("No input files to process")]
    EmptyInput,
}

impl From<SourceError> for PipelineError {
    fn from(err: SourceError) -> Self {
        PipelineError::Parse(err.into())
    }
}

impl From<InvariantError> for PipelineError {
    fn from(err: InvariantError) -> Self {
        PipelineError::Parse(err.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source document operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for record validation.
pub type InvariantResult<T> = Result<T, InvariantError>;

/// Result type for single-document parsing.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // InvariantError -> ParseError -> PipelineError
        let err = InvariantError::OverOverflow { over: 3, limit: 6 };
        let pipeline_err: PipelineError = err.into();
        let msg = pipeline_err.to_string();
        assert!(msg.contains("Over 3"));
        assert!(msg.contains('6'));

        // SourceError -> PipelineError
        let source_err = SourceError::MissingKey("dates".into());
        let pipeline_err: PipelineError = source_err.into();
        assert!(pipeline_err.to_string().contains("dates"));
    }

    #[test]
    fn test_document_error_names_path() {
        let err = PipelineError::Document {
            path: PathBuf::from("matches/1234.json"),
            source: SourceError::MissingKey("teams".into()).into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("matches/1234.json"));
        assert!(msg.contains("teams"));
    }

    #[test]
    fn test_missing_fields_format() {
        let err = InvariantError::MissingFields(vec!["venue".into(), "city".into()]);
        assert_eq!(err.to_string(), "Missing required fields: venue, city");
    }
}
