//! Record Error Types

use std::path::Path;
use thiserror::Error;

/// Errors while reading a source file
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    /// Row with the wrong column count or a non-numeric field
    #[error("Malformed record in {path}: {message}")]
    Malformed { path: String, message: String },

    /// File could not be opened or read
    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl RecordError {
    pub(crate) fn from_csv(path: &Path, err: csv::Error) -> Self {
        let path = path.display().to_string();
        let message = err.to_string();
        if err.is_io_error() {
            RecordError::Io { path, message }
        } else {
            RecordError::Malformed { path, message }
        }
    }
}
