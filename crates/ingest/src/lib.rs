//! Source Directory Ingestion
//!
//! Walks a configured directory of tab-separated files, builds one batch per
//! file and commits batches until the first one lands.

mod dataset;
mod error;
mod orchestrator;

pub use dataset::Dataset;
pub use error::IngestError;
pub use orchestrator::{ingest, AttemptResult, FileAttempt, IngestOutcome, IngestReport};
