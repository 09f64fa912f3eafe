//! Ingestion Orchestrator
//!
//! One call walks the source directory in file-name order. Each file is
//! parsed into a batch and committed in a single transaction. The first
//! successful commit ends the call; parse and commit failures are recorded
//! and the next file is tried.

use crate::dataset::{Batch, Dataset};
use crate::error::IngestError;
use record_parser::RecordError;
use std::path::{Path, PathBuf};
use storage::Repository;
use tracing::{debug, info, warn};

/// What happened to one candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    /// Batch committed with this many rows
    Committed(u64),
    /// File held no rows; nothing to commit
    Empty,
    /// File could not be parsed; no commit attempted
    ParseFailure(String),
    /// Commit rolled back
    CommitFailure(String),
}

impl AttemptResult {
    fn label(&self) -> &'static str {
        match self {
            AttemptResult::Committed(_) => "committed",
            AttemptResult::Empty => "empty",
            AttemptResult::ParseFailure(_) => "parse_failure",
            AttemptResult::CommitFailure(_) => "commit_failure",
        }
    }
}

/// One entry of the per-call trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttempt {
    pub file: PathBuf,
    pub result: AttemptResult,
}

/// How an ingestion call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Source directory does not exist
    NoSource,
    /// This file's batch was persisted; later files were not visited
    Committed { file: PathBuf, rows: u64 },
    /// Every file was tried and none committed
    Exhausted,
}

/// Result of one ingestion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub dataset: Dataset,
    pub outcome: IngestOutcome,
    /// Files visited, in order
    pub attempts: Vec<FileAttempt>,
}

impl IngestReport {
    pub fn is_committed(&self) -> bool {
        matches!(self.outcome, IngestOutcome::Committed { .. })
    }

    /// Rows persisted by this call
    pub fn committed_rows(&self) -> u64 {
        match self.outcome {
            IngestOutcome::Committed { rows, .. } => rows,
            _ => 0,
        }
    }
}

/// Ingest `dataset` files from `dir` into `repo`.
///
/// Returns `Ok` for a missing directory, a committed file, or a run where
/// every file failed. Returns [`IngestError::Parse`] only when no commit
/// was attempted because every non-empty file failed to parse.
pub async fn ingest(
    repo: &Repository,
    dataset: Dataset,
    dir: &Path,
) -> Result<IngestReport, IngestError> {
    let io_error = |e: std::io::Error| IngestError::Io {
        path: dir.display().to_string(),
        message: e.to_string(),
    };

    if !tokio::fs::try_exists(dir).await.map_err(io_error)? {
        info!("No {} source directory at {}, nothing to ingest", dataset, dir.display());
        return Ok(IngestReport {
            dataset,
            outcome: IngestOutcome::NoSource,
            attempts: Vec::new(),
        });
    }

    let files = list_files(dir).await.map_err(io_error)?;
    debug!("Found {} candidate {} files in {}", files.len(), dataset, dir.display());

    let mut attempts = Vec::with_capacity(files.len());
    let mut commit_attempted = false;
    let mut first_parse_error: Option<String> = None;

    for file in files {
        let result = match build(dataset, file.clone()).await? {
            Err(e) => {
                warn!("Skipping {}: {}", file.display(), e);
                first_parse_error.get_or_insert_with(|| e.to_string());
                AttemptResult::ParseFailure(e.to_string())
            }
            Ok(batch) if batch.is_empty() => {
                debug!("Skipping {}: no rows", file.display());
                AttemptResult::Empty
            }
            Ok(batch) => {
                commit_attempted = true;
                match batch.commit(repo).await {
                    Ok(rows) => AttemptResult::Committed(rows),
                    Err(e) => {
                        warn!("Unable to commit {} batch from {}: {}", dataset, file.display(), e);
                        AttemptResult::CommitFailure(e.to_string())
                    }
                }
            }
        };

        metrics::counter!(
            "ingest_files_total",
            "dataset" => dataset.name(),
            "result" => result.label()
        )
        .increment(1);

        let committed = match result {
            AttemptResult::Committed(rows) => Some(rows),
            _ => None,
        };
        attempts.push(FileAttempt {
            file: file.clone(),
            result,
        });

        if let Some(rows) = committed {
            metrics::counter!("ingest_rows_committed_total", "dataset" => dataset.name())
                .increment(rows);
            info!("Committed {} {} rows from {}", rows, dataset, file.display());
            return Ok(IngestReport {
                dataset,
                outcome: IngestOutcome::Committed { file, rows },
                attempts,
            });
        }
    }

    if !commit_attempted {
        if let Some(message) = first_parse_error {
            return Err(IngestError::Parse { dataset, message });
        }
    }

    warn!(
        "No {} file committed after {} attempts in {}",
        dataset,
        attempts.len(),
        dir.display()
    );
    Ok(IngestReport {
        dataset,
        outcome: IngestOutcome::Exhausted,
        attempts,
    })
}

/// Regular files directly under `dir`, sorted by file name
async fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        // Follows symlinks; a dangling link is not a regular file
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => warn!("Ignoring unreadable entry {}: {}", path.display(), e),
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

async fn build(dataset: Dataset, path: PathBuf) -> Result<Result<Batch, RecordError>, IngestError> {
    tokio::task::spawn_blocking(move || dataset.build(&path))
        .await
        .map_err(|e| IngestError::Task(e.to_string()))
}
