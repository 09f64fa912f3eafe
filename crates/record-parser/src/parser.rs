//! Tab-Separated Row Reader
//!
//! Files carry no header; columns are assigned by position.

use crate::error::RecordError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// One weather line: date, max temp, min temp, precipitation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeatherRow {
    pub date: String,
    pub max_temp: i32,
    pub min_temp: i32,
    pub precipitation: i32,
}

/// One crop line: year, yield
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CropRow {
    pub year: String,
    pub yield_per_year: i32,
}

/// A row type read by position with a fixed column count
pub trait PositionalRow: DeserializeOwned {
    const COLUMNS: usize;
}

impl PositionalRow for WeatherRow {
    const COLUMNS: usize = 4;
}

impl PositionalRow for CropRow {
    const COLUMNS: usize = 2;
}

/// Lazy row iterator over one file.
///
/// Yields nothing when the path is not an existing regular file.
pub struct Rows<T> {
    path: PathBuf,
    inner: Option<csv::StringRecordsIntoIter<File>>,
    _row: PhantomData<T>,
}

impl<T: PositionalRow> Rows<T> {
    fn open(path: &Path) -> Result<Self, RecordError> {
        let inner = if path.is_file() {
            let reader = csv::ReaderBuilder::new()
                .delimiter(b'\t')
                .has_headers(false)
                .trim(csv::Trim::All)
                .from_path(path)
                .map_err(|e| RecordError::from_csv(path, e))?;
            Some(reader.into_records())
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner,
            _row: PhantomData,
        })
    }

    /// Reject surplus or missing columns before deserializing; serde alone
    /// would silently drop trailing fields.
    fn parse(&self, record: csv::StringRecord) -> Result<T, RecordError> {
        if record.len() != T::COLUMNS {
            let line = record.position().map_or(0, |pos| pos.line());
            return Err(RecordError::Malformed {
                path: self.path.display().to_string(),
                message: format!(
                    "line {}: expected {} columns, found {}",
                    line,
                    T::COLUMNS,
                    record.len()
                ),
            });
        }
        record
            .deserialize(None)
            .map_err(|e| RecordError::from_csv(&self.path, e))
    }
}

impl<T: PositionalRow> Iterator for Rows<T> {
    type Item = Result<T, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.inner.as_mut()?.next()?;
        Some(
            record
                .map_err(|e| RecordError::from_csv(&self.path, e))
                .and_then(|record| self.parse(record)),
        )
    }
}

/// Read weather rows from `path`
pub fn read_weather_rows(path: &Path) -> Result<Rows<WeatherRow>, RecordError> {
    Rows::open(path)
}

/// Read crop rows from `path`
pub fn read_crop_rows(path: &Path) -> Result<Rows<CropRow>, RecordError> {
    Rows::open(path)
}
