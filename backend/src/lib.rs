//! # Ballbyball - cricket match documents to flat delivery records
//!
//! Ballbyball reads nested ball-by-ball match documents and flattens them into
//! one validated record per delivery, written as a JSON array or as JSON lines.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Match JSON  │────▶│   Parser    │────▶│  Transform  │────▶│   Output    │
//! │ (auto-enc)  │     │ (traversal) │     │ (validate)  │     │ (json/jsonl)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ballbyball::{convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! let summary = convert_file(
//!     Path::new("match.json"),
//!     Path::new("output.json"),
//!     &ConvertOptions::default(),
//! ).unwrap();
//! println!("Wrote {} deliveries", summary.records);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (MatchInfo, DeliveryInfo, Wicket)
//! - [`source`] - Source document decoding and typed deserialization
//! - [`parser`] - Match info extraction and delivery traversal
//! - [`transform`] - Record building, validation, and the pipeline
//! - [`output`] - Writers, record loader, and batch fan-out
//! - [`validation`] - Delivery record schema validation
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Reading
pub mod source;
pub mod parser;

// Transformation
pub mod transform;

// Writing
pub mod output;

// Validation
pub mod validation;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    InvariantError,
    OutputError,
    ParseError,
    PipelineError,
    SourceError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    DeliveryInfo,
    FlatRecord,
    Gender,
    MatchInfo,
    MatchType,
    TossDecision,
    Wicket,
    WinMarginType,
};

// =============================================================================
// Re-exports - Source documents
// =============================================================================

pub use source::{
    decode_content,
    detect_encoding,
    parse_document_bytes,
    read_document,
    MatchDocument,
};

// =============================================================================
// Re-exports - Parser
// =============================================================================

pub use parser::{
    extract_match_info,
    EventNamePattern,
    GenderClassifier,
    MatchParser,
    WomensEventName,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{transform_record, validate_record};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{
    load_file,
    process_batch,
    write_records,
    BatchOptions,
    OutputFormat,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    is_valid,
    is_valid_delivery_record,
    validate,
    validate_delivery_record,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    convert_batch,
    convert_batch_with,
    convert_file,
    convert_file_with,
    write_document,
    BatchSummary,
    ConvertOptions,
    DEFAULT_OUTPUT,
};
