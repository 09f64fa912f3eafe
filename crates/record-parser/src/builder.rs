//! Batch Builder

use crate::error::RecordError;
use crate::parser::{read_crop_rows, read_weather_rows};
use std::path::Path;
use storage::{CropRecord, WeatherRecord};
use tracing::debug;

/// Station tag for a weather file: its name with the last extension removed
pub fn station_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Build every weather record in one file. Any malformed row fails the batch.
pub fn build_weather_batch(path: &Path) -> Result<Vec<WeatherRecord>, RecordError> {
    let station = station_from_path(path);
    let batch = read_weather_rows(path)?
        .map(|row| {
            row.map(|row| WeatherRecord {
                id: None,
                date: row.date,
                max_temp: row.max_temp,
                min_temp: row.min_temp,
                precipitation: row.precipitation,
                station: station.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Built {} weather records for station {}", batch.len(), station);
    Ok(batch)
}

/// Build every crop record in one file
pub fn build_crop_batch(path: &Path) -> Result<Vec<CropRecord>, RecordError> {
    let batch = read_crop_rows(path)?
        .map(|row| {
            row.map(|row| CropRecord {
                id: None,
                year: row.year,
                yield_per_year: row.yield_per_year,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Built {} crop records from {}", batch.len(), path.display());
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_station_strips_last_extension() {
        assert_eq!(station_from_path(Path::new("/data/wx/stationA.tsv")), "stationA");
        assert_eq!(station_from_path(Path::new("USC00110072.txt")), "USC00110072");
        assert_eq!(station_from_path(Path::new("archive.2024.txt")), "archive.2024");
        assert_eq!(station_from_path(Path::new("noext")), "noext");
    }

    #[test]
    fn test_weather_batch_serializes_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stationA.tsv");
        fs::write(&path, "20240101\t30\t10\t5\n").unwrap();

        let batch = build_weather_batch(&path).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(
            serde_json::to_string(&batch[0]).unwrap(),
            r#"{"date":"20240101","max_temp":30,"min_temp":10,"precipitation":5,"station":"stationA"}"#
        );
    }

    #[test]
    fn test_crop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yield.txt");
        fs::write(&path, "1985\t225447\n1986\t208944\n").unwrap();

        let batch = build_crop_batch(&path).unwrap();
        assert_eq!(
            batch,
            vec![
                CropRecord { id: None, year: "1985".to_string(), yield_per_year: 225447 },
                CropRecord { id: None, year: "1986".to_string(), yield_per_year: 208944 },
            ]
        );
    }

    #[test]
    fn test_one_bad_row_fails_whole_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yield.txt");
        fs::write(&path, "1985\t225447\n1986\tlots\n").unwrap();

        assert!(matches!(
            build_crop_batch(&path),
            Err(RecordError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_file_builds_empty_batch() {
        let batch = build_weather_batch(Path::new("/nonexistent/stationA.tsv")).unwrap();
        assert!(batch.is_empty());
    }

    proptest! {
        #[test]
        fn prop_station_is_stem(stem in "[A-Za-z0-9_]{1,16}", ext in "[a-z]{1,4}") {
            let path = PathBuf::from("weather").join(format!("{stem}.{ext}"));
            prop_assert_eq!(station_from_path(&path), stem);
        }
    }
}
