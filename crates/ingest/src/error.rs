//! Ingestion Error Types

use crate::Dataset;
use thiserror::Error;

/// Errors that abort an ingestion call.
///
/// Per-file commit failures are not errors; they are recorded in the
/// [`IngestReport`](crate::IngestReport) and iteration moves on.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Every candidate file failed to parse, so no commit was ever attempted
    #[error("No {dataset} file could be parsed: {message}")]
    Parse { dataset: Dataset, message: String },

    /// The source directory exists but could not be listed
    #[error("Cannot read source directory {path}: {message}")]
    Io { path: String, message: String },

    /// Blocking parse task panicked or was cancelled
    #[error("Batch build task failed: {0}")]
    Task(String),
}
