//! Offline ground-truth construction for predictor training.
//!
//! Historical readings are labeled with the AQI aggregate from
//! [`crate::index`]; rows where the aggregate is undefined are dropped, never
//! zero-filled. Fitting the predictor against the labeled rows is the offline
//! pipeline's job, not this crate's.

use crate::index::{PollutantReading, aggregate};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// One historical reading paired with its ground-truth AQI target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledReading {
    pub reading: PollutantReading,
    pub target_aqi: f64,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read readings file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse readings file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Load historical readings from a JSON array file.
pub fn load_readings_from_path(
    path: impl AsRef<Path>,
) -> Result<Vec<PollutantReading>, DatasetError> {
    let contents = std::fs::read_to_string(path)?;
    let readings: Vec<PollutantReading> = serde_json::from_str(&contents)?;
    Ok(readings)
}

/// Label readings with their AQI aggregate, dropping rows where the
/// aggregate is undefined.
pub fn label_readings(
    readings: impl IntoIterator<Item = PollutantReading>,
) -> Vec<LabeledReading> {
    readings
        .into_iter()
        .filter_map(|reading| {
            aggregate(&reading).map(|target_aqi| LabeledReading {
                reading,
                target_aqi,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{Pollutant, sub_index};
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn rows_without_an_aggregate_are_dropped() {
        let in_range = PollutantReading {
            pm2_5: Some(40.0),
            ..PollutantReading::default()
        };
        let out_of_range = PollutantReading {
            pm10: Some(9999.0),
            ..PollutantReading::default()
        };
        let empty = PollutantReading::default();

        let labeled = label_readings([in_range.clone(), out_of_range, empty]);

        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled[0].reading, in_range);
    }

    #[test]
    fn target_is_the_float_aggregate() {
        let reading = PollutantReading {
            pm2_5: Some(40.0),
            pm10: Some(500.0),
            ..PollutantReading::default()
        };

        let labeled = label_readings([reading]);

        let expected = sub_index(Pollutant::Pm10, 500.0).expect("pm10 in band");
        assert_eq!(labeled[0].target_aqi, expected);
    }

    #[test]
    fn readings_load_from_a_json_array() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("airindex-readings-{unique}.json"));
        let contents = r#"[
            {"pm2_5": 22.0, "pm10": 48.0, "no2": 12.0, "so2": 4.0, "co": 0.6, "o3": 30.0, "nh3": 9.0},
            {"pm2_5": 140.5}
        ]"#;
        fs::write(&path, contents)?;

        let readings = load_readings_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].pm10, Some(48.0));
        assert_eq!(readings[1].pm2_5, Some(140.5));
        assert_eq!(readings[1].nh3, None);
        Ok(())
    }

    #[test]
    fn malformed_readings_file_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("airindex-readings-bad-{unique}.json"));
        fs::write(&path, "{not an array")?;

        let result = load_readings_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(DatasetError::Parse(_))));
        Ok(())
    }
}
