//! Transformation module.
//!
//! - Record: merges match and delivery facts into a validated flat record
//! - Pipeline: end-to-end conversion of files and batches

pub mod pipeline;
pub mod record;

pub use pipeline::*;
pub use record::{transform_record, validate_record, FieldKind, OPTIONAL_FIELDS, REQUIRED_FIELDS};
