//! Ingestion Routes

use axum::{extract::State, Json};
use ingest::{ingest, Dataset, IngestError, IngestOutcome, IngestReport};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn};

use super::ApiMessage;
use crate::AppState;

/// Ingest the first committable weather file
pub async fn ingest_weather(State(state): State<Arc<AppState>>) -> Json<ApiMessage> {
    Json(match run(&state, Dataset::Weather, &state.sources.weather_dir).await {
        Ok(_) => ApiMessage::Success("Saved weather."),
        Err(_) => ApiMessage::Error("Unable to save weather."),
    })
}

/// Ingest the first committable crop-yield file
pub async fn ingest_crop(State(state): State<Arc<AppState>>) -> Json<ApiMessage> {
    Json(match run(&state, Dataset::Crop, &state.sources.crop_dir).await {
        Ok(_) => ApiMessage::Success("Saved crop."),
        Err(_) => ApiMessage::Error("Unable to save crop."),
    })
}

/// Per-file failures come back as `Ok`; only an aborted call is an error
async fn run(state: &AppState, dataset: Dataset, dir: &Path) -> Result<IngestReport, IngestError> {
    let _writer = state.ingest_lock.lock().await;

    let result = ingest(&state.repository, dataset, dir).await;
    match &result {
        Ok(report) if report.outcome == IngestOutcome::Exhausted => warn!(
            "{} ingestion committed nothing after {} attempts",
            dataset,
            report.attempts.len()
        ),
        Ok(_) => {}
        Err(e) => error!("{} ingestion failed: {}", dataset, e),
    }
    result
}
