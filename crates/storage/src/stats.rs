//! Grouped Weather Statistics
//!
//! Each statistic attaches every stored record to its station's aggregate
//! (average max temp, average min temp, precipitation total) and partitions
//! the records by that aggregate value. The result is whole records grouped
//! by key, not a table of scalars.

use crate::{Repository, StorageError, WeatherRecord};
use serde::Serialize;
use sqlx::FromRow;

/// Records sharing one aggregate value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatGroup<K> {
    pub key: K,
    pub records: Vec<WeatherRecord>,
}

/// The three grouped statistics served by the stats endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherStats {
    pub max_temp: Vec<StatGroup<f64>>,
    pub min_temp: Vec<StatGroup<f64>>,
    pub total: Vec<StatGroup<i64>>,
}

#[derive(FromRow)]
struct AverageRow {
    #[sqlx(flatten)]
    record: WeatherRecord,
    #[sqlx(rename = "group_key")]
    key: f64,
}

#[derive(FromRow)]
struct TotalRow {
    #[sqlx(flatten)]
    record: WeatherRecord,
    #[sqlx(rename = "group_key")]
    key: i64,
}

const AVG_MAX_TEMP_SQL: &str = "SELECT id, date, max_temp, min_temp, precipitation, station, \
     AVG(max_temp) OVER (PARTITION BY station) AS group_key \
     FROM weather ORDER BY group_key, station, id";

const AVG_MIN_TEMP_SQL: &str = "SELECT id, date, max_temp, min_temp, precipitation, station, \
     AVG(min_temp) OVER (PARTITION BY station) AS group_key \
     FROM weather ORDER BY group_key, station, id";

const SUM_PRECIPITATION_SQL: &str = "SELECT id, date, max_temp, min_temp, precipitation, station, \
     SUM(precipitation) OVER (PARTITION BY station) AS group_key \
     FROM weather ORDER BY group_key, station, id";

/// Split key-ordered rows into runs of equal key
fn partition<K: PartialEq>(rows: impl IntoIterator<Item = (K, WeatherRecord)>) -> Vec<StatGroup<K>> {
    let mut groups: Vec<StatGroup<K>> = Vec::new();
    for (key, record) in rows {
        match groups.last_mut() {
            Some(group) if group.key == key => group.records.push(record),
            _ => groups.push(StatGroup {
                key,
                records: vec![record],
            }),
        }
    }
    groups
}

impl Repository {
    async fn grouped_average(&self, sql: &str) -> Result<Vec<StatGroup<f64>>, StorageError> {
        let rows = sqlx::query_as::<_, AverageRow>(sql)
            .fetch_all(self.pool())
            .await?;
        Ok(partition(rows.into_iter().map(|r| (r.key, r.record))))
    }

    /// Records grouped by their station's average maximum temperature
    pub async fn group_by_avg_max_temp(&self) -> Result<Vec<StatGroup<f64>>, StorageError> {
        self.grouped_average(AVG_MAX_TEMP_SQL).await
    }

    /// Records grouped by their station's average minimum temperature
    pub async fn group_by_avg_min_temp(&self) -> Result<Vec<StatGroup<f64>>, StorageError> {
        self.grouped_average(AVG_MIN_TEMP_SQL).await
    }

    /// Records grouped by their station's total precipitation
    pub async fn group_by_total_precipitation(&self) -> Result<Vec<StatGroup<i64>>, StorageError> {
        let rows = sqlx::query_as::<_, TotalRow>(SUM_PRECIPITATION_SQL)
            .fetch_all(self.pool())
            .await?;
        Ok(partition(rows.into_iter().map(|r| (r.key, r.record))))
    }

    pub async fn weather_stats(&self) -> Result<WeatherStats, StorageError> {
        Ok(WeatherStats {
            max_temp: self.group_by_avg_max_temp().await?,
            min_temp: self.group_by_avg_min_temp().await?,
            total: self.group_by_total_precipitation().await?,
        })
    }
}
