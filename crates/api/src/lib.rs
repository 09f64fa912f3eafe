//! Harvest API Server
//!
//! REST endpoints that trigger weather and crop-yield ingestion and serve
//! grouped weather statistics.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod routes;
mod settings;

pub use settings::{AppConfig, ConfigError, DatabaseConfig, LogConfig, ServerConfig, SourceConfig};

use storage::Repository;

/// Application state shared across handlers
pub struct AppState {
    /// Storage repository (pooled; each request checks out its own session)
    pub repository: Repository,
    /// Directories scanned by the ingestion endpoints
    pub sources: SourceConfig,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Held for the duration of one ingestion call
    ingest_lock: Mutex<()>,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Repository, sources: SourceConfig) -> Self {
        Self {
            repository,
            sources,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            ingest_lock: Mutex::new(()),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub records: Option<RecordCounts>,
}

/// Stored row counts
#[derive(Debug, Serialize)]
pub struct RecordCounts {
    pub weather: i64,
    pub crop: i64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/weather", get(routes::ingestion::ingest_weather))
        .route("/api/yield", get(routes::ingestion::ingest_crop))
        .route("/api/weather/stats", get(routes::stats::get_stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let counts = async {
        Ok::<_, storage::StorageError>(RecordCounts {
            weather: state.repository.weather_count().await?,
            crop: state.repository.crop_count().await?,
        })
    }
    .await;

    let (status, records) = match counts {
        Ok(counts) => ("healthy", Some(counts)),
        Err(e) => {
            warn!("Health check could not reach the database: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        records,
    })
}

/// Initialize logging
pub fn init_logging(config: &LogConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.expect("Failed to set tracing subscriber");
}

/// Connect the store and serve until the listener fails
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let repository =
        Repository::connect(&config.database.url, config.database.max_connections).await?;

    let state = Arc::new(AppState::new(repository, config.sources));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
