//! Record Parsing and Building
//!
//! Reads headerless, tab-separated weather and crop-yield files into typed
//! rows and turns each file's rows into a persistence-ready batch.

mod builder;
mod error;
mod parser;

pub use builder::{build_crop_batch, build_weather_batch, station_from_path};
pub use error::RecordError;
pub use parser::{read_crop_rows, read_weather_rows, CropRow, PositionalRow, Rows, WeatherRow};
