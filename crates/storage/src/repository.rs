//! Repository Implementation

use crate::StorageError;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS weather (
    id            INTEGER PRIMARY KEY,
    date          TEXT    NOT NULL CHECK (length(date) <= 8),
    max_temp      INTEGER NOT NULL,
    min_temp      INTEGER NOT NULL,
    precipitation INTEGER NOT NULL,
    station       TEXT    NOT NULL CHECK (length(station) <= 16),
    UNIQUE (station, date)
);

CREATE TABLE IF NOT EXISTS crop (
    id             INTEGER PRIMARY KEY,
    year           TEXT    NOT NULL CHECK (length(year) <= 8),
    yield_per_year INTEGER NOT NULL,
    UNIQUE (year)
);
"#;

/// Daily weather observation for one station
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeatherRecord {
    /// Assigned by the store on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// YYYYMMDD
    pub date: String,
    pub max_temp: i32,
    pub min_temp: i32,
    pub precipitation: i32,
    /// Source file stem
    pub station: String,
}

/// Yearly crop yield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CropRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub year: String,
    pub yield_per_year: i32,
}

/// Repository for record access.
///
/// Cloning is cheap and shares the underlying pool; every operation checks
/// out its own connection, so concurrent callers never share a session.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (creating if missing) the database at `url` and apply the schema
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        info!(url, "Connected to SQLite repository");
        Ok(repo)
    }

    /// Create a private in-memory repository
    pub async fn in_memory() -> Result<Self, StorageError> {
        // An in-memory database lives and dies with its connection, so the
        // pool must hold exactly one and never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;

        let repo = Self { pool };
        repo.migrate().await?;
        debug!("Created in-memory repository");
        Ok(repo)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a weather batch atomically, returning the number of rows written.
    ///
    /// Any failing row rolls the whole batch back.
    pub async fn insert_weather_batch(&self, batch: &[WeatherRecord]) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for record in batch {
            written += sqlx::query(
                "INSERT INTO weather (id, date, max_temp, min_temp, precipitation, station) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(record.id)
            .bind(&record.date)
            .bind(record.max_temp)
            .bind(record.min_temp)
            .bind(record.precipitation)
            .bind(&record.station)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        debug!("Committed {} weather rows", written);
        Ok(written)
    }

    /// Insert a crop batch atomically, returning the number of rows written
    pub async fn insert_crop_batch(&self, batch: &[CropRecord]) -> Result<u64, StorageError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for record in batch {
            written += sqlx::query("INSERT INTO crop (id, year, yield_per_year) VALUES (?, ?, ?)")
                .bind(record.id)
                .bind(&record.year)
                .bind(record.yield_per_year)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        tx.commit().await?;
        debug!("Committed {} crop rows", written);
        Ok(written)
    }

    /// All stored weather records, by station then date
    pub async fn list_weather(&self) -> Result<Vec<WeatherRecord>, StorageError> {
        let records = sqlx::query_as::<_, WeatherRecord>(
            "SELECT id, date, max_temp, min_temp, precipitation, station \
             FROM weather ORDER BY station, date, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    /// All stored crop records, by year
    pub async fn list_crop(&self) -> Result<Vec<CropRecord>, StorageError> {
        let records = sqlx::query_as::<_, CropRecord>(
            "SELECT id, year, yield_per_year FROM crop ORDER BY year, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    pub async fn weather_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM weather")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn crop_count(&self) -> Result<i64, StorageError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM crop")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather(date: &str, station: &str) -> WeatherRecord {
        WeatherRecord {
            id: None,
            date: date.to_string(),
            max_temp: 30,
            min_temp: 10,
            precipitation: 5,
            station: station.to_string(),
        }
    }

    #[tokio::test]
    async fn test_weather_insert_and_retrieve() {
        let repo = Repository::in_memory().await.unwrap();

        let written = repo
            .insert_weather_batch(&[weather("20240101", "stationA"), weather("20240102", "stationA")])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let stored = repo.list_weather().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|r| r.id.is_some()));
        assert_eq!(stored[0].date, "20240101");
        assert_eq!(repo.weather_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_crop_insert_and_retrieve() {
        let repo = Repository::in_memory().await.unwrap();

        let batch = vec![
            CropRecord { id: None, year: "1985".to_string(), yield_per_year: 225447 },
            CropRecord { id: None, year: "1986".to_string(), yield_per_year: 208944 },
        ];
        assert_eq!(repo.insert_crop_batch(&batch).await.unwrap(), 2);

        let stored = repo.list_crop().await.unwrap();
        assert_eq!(stored[1].yield_per_year, 208944);
        assert_eq!(repo.crop_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_no_rows() {
        let repo = Repository::in_memory().await.unwrap();

        // Second row duplicates the first (station, date)
        let err = repo
            .insert_weather_batch(&[weather("20240101", "stationA"), weather("20240101", "stationA")])
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ConstraintViolation(_)));
        assert_eq!(repo.weather_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_primary_key_rejected() {
        let repo = Repository::in_memory().await.unwrap();

        let mut first = weather("20240101", "stationA");
        first.id = Some(7);
        repo.insert_weather_batch(&[first]).await.unwrap();

        let mut clash = weather("20240102", "stationB");
        clash.id = Some(7);
        assert!(repo.insert_weather_batch(&[clash]).await.is_err());
        assert_eq!(repo.weather_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_column_length_limits() {
        let repo = Repository::in_memory().await.unwrap();

        let long_station = weather("20240101", "a-station-name-over-16");
        assert!(matches!(
            repo.insert_weather_batch(&[long_station]).await,
            Err(StorageError::ConstraintViolation(_))
        ));

        let long_year = CropRecord { id: None, year: "198501011".to_string(), yield_per_year: 1 };
        assert!(repo.insert_crop_batch(&[long_year]).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_commits_nothing() {
        let repo = Repository::in_memory().await.unwrap();
        assert_eq!(repo.insert_crop_batch(&[]).await.unwrap(), 0);
        assert_eq!(repo.crop_count().await.unwrap(), 0);
    }

    #[test]
    fn test_built_record_serializes_without_id() {
        let json = serde_json::to_string(&weather("20240101", "stationA")).unwrap();
        assert_eq!(
            json,
            r#"{"date":"20240101","max_temp":30,"min_temp":10,"precipitation":5,"station":"stationA"}"#
        );
    }
}
