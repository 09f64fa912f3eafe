//! Storage Layer
//!
//! SQLite persistence for ingested weather and crop-yield records, plus the
//! grouped statistics read over stored weather.

mod repository;
mod stats;

pub use repository::{CropRecord, Repository, WeatherRecord};
pub use stats::{StatGroup, WeatherStats};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// A row broke a uniqueness or check constraint; the batch was rolled back
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_check_violation() =>
            {
                StorageError::ConstraintViolation(db.message().to_string())
            }
            other @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                StorageError::ConnectionError(other.to_string())
            }
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}
