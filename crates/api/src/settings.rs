//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `HARVEST__*` environment variables
//! (e.g. `HARVEST__SOURCES__WEATHER_DIR=/data/wx`).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind_addr: String,
}

/// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
    /// Pool size; each request checks out its own connection
    pub max_connections: u32,
}

/// Source directories scanned by the ingestion endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub weather_dir: PathBuf,
    pub crop_dir: PathBuf,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

/// Full service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sources: SourceConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from `path` (required when given) or from an
    /// optional `harvest.toml` in the working directory, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("harvest").required(false),
        };

        Self::build(
            Config::builder()
                .add_source(file)
                .add_source(Environment::with_prefix("HARVEST").separator("__")),
        )
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: AppConfig = builder
            .set_default("server.bind_addr", "0.0.0.0:8080")?
            .set_default("database.url", "sqlite://harvest.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Presence-only checks; directories may legitimately not exist yet
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::Missing("server.bind_addr"));
        }
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Missing("database.url"));
        }
        if self.sources.weather_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("sources.weather_dir"));
        }
        if self.sources.crop_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("sources.crop_dir"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_fill_optional_keys() {
        let config = from_toml(
            r#"
            [sources]
            weather_dir = "data/wx_data"
            crop_dir = "data/yld_data"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.log.level, "info");
        assert!(!config.log.json);
        assert_eq!(config.sources.weather_dir, PathBuf::from("data/wx_data"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = from_toml(
            r#"
            [server]
            bind_addr = "127.0.0.1:9000"

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [sources]
            weather_dir = "wx"
            crop_dir = "yld"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 1);
    }

    #[test]
    fn test_missing_source_dir_rejected() {
        let result = from_toml(
            r#"
            [sources]
            weather_dir = "wx"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_blank_values_rejected() {
        let result = from_toml(
            r#"
            [database]
            url = " "

            [sources]
            weather_dir = "wx"
            crop_dir = "yld"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Missing("database.url"))));

        let result = from_toml(
            r#"
            [sources]
            weather_dir = ""
            crop_dir = "yld"
            "#,
        );
        assert!(matches!(
            result,
            Err(ConfigError::Missing("sources.weather_dir"))
        ));
    }
}
