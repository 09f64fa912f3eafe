//! Dataset Kinds

use record_parser::{build_crop_batch, build_weather_batch, RecordError};
use std::fmt;
use std::path::Path;
use storage::{CropRecord, Repository, StorageError, WeatherRecord};

/// Which kind of source file is being ingested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Weather,
    Crop,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Weather => "weather",
            Dataset::Crop => "crop",
        }
    }

    pub(crate) fn build(&self, path: &Path) -> Result<Batch, RecordError> {
        match self {
            Dataset::Weather => build_weather_batch(path).map(Batch::Weather),
            Dataset::Crop => build_crop_batch(path).map(Batch::Crop),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All records built from one file
#[derive(Debug)]
pub(crate) enum Batch {
    Weather(Vec<WeatherRecord>),
    Crop(Vec<CropRecord>),
}

impl Batch {
    pub(crate) fn len(&self) -> usize {
        match self {
            Batch::Weather(records) => records.len(),
            Batch::Crop(records) => records.len(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the whole batch in one transaction
    pub(crate) async fn commit(&self, repo: &Repository) -> Result<u64, StorageError> {
        match self {
            Batch::Weather(records) => repo.insert_weather_batch(records).await,
            Batch::Crop(records) => repo.insert_crop_batch(records).await,
        }
    }
}
