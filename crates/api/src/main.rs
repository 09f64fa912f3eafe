//! Harvest - Main Entry Point
//!
//! Usage: `harvest-server [CONFIG_FILE]`

use api::{init_logging, run_server, AppConfig};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    init_logging(&config.log);

    info!("=== Harvest v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        weather_dir = %config.sources.weather_dir.display(),
        crop_dir = %config.sources.crop_dir.display(),
        "Source directories"
    );

    run_server(config).await
}
