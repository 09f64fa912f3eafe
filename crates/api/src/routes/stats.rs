//! Weather Statistics Route

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

use super::ApiMessage;
use crate::AppState;

/// Records grouped by per-station average max/min temperature and total precipitation
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    match state.repository.weather_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Unable to load weather statistics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiMessage::Error("Unable to load weather statistics.")),
            )
                .into_response()
        }
    }
}
