//! Predictor boundary and model loading.
//!
//! The trained predictor is restored at startup from a JSON model file
//! selecting an implementation by name. Implementations approximate the AQI
//! ground truth produced by the [`crate::index`] aggregation.

use crate::index::Pollutant;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

pub mod linear_v1;
pub mod linear_v2;
pub mod mock;

use linear_v1::{LinearV1Model, LinearV1Params};
use linear_v2::{LinearV2Model, LinearV2Params};

pub const FEATURE_COUNT: usize = 7;

/// Feature vector in [`Pollutant::ALL`] order.
pub type Features = [f64; FEATURE_COUNT];

/// Ordered wire names of the predictor's features.
pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
    Pollutant::ALL.map(Pollutant::key)
}

/// A regression predictor mapping a pollutant feature vector to a raw AQI
/// estimate.
///
/// Implementations must be safe for concurrent invocation; one that is not
/// internally thread-safe has to bring its own interior locking (see
/// [`mock::MockPredictor`] for the pattern).
pub trait AqiPredictor: Send + Sync + std::fmt::Debug {
    /// Predict a raw AQI value. Features arrive in [`Pollutant::ALL`] order.
    fn predict(&self, features: &Features) -> f64;

    /// Implementation name reported by model introspection.
    fn name(&self) -> &'static str;
}

/// On-disk model file: an implementation name plus its parameters.
#[derive(Debug, Deserialize)]
pub struct ModelFile {
    pub model: String,
    pub params: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse model file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model: {0}")]
    Invalid(String),
}

// Model factory
pub fn create_model(file: &ModelFile) -> Result<Box<dyn AqiPredictor>, ModelError> {
    match file.model.as_str() {
        "linear_v1" => {
            let params: LinearV1Params = serde_json::from_value(file.params.clone())?;
            Ok(Box::new(LinearV1Model::from_params(&params)?))
        }
        "linear_v2" => {
            let params: LinearV2Params = serde_json::from_value(file.params.clone())?;
            Ok(Box::new(LinearV2Model::from_params(&params)?))
        }
        other => Err(ModelError::Invalid(format!("unknown model: {other}"))),
    }
}

pub fn load_model_from_path(path: impl AsRef<Path>) -> Result<Box<dyn AqiPredictor>, ModelError> {
    let contents = std::fs::read_to_string(path)?;
    let file: ModelFile = serde_json::from_str(&contents)?;
    create_model(&file)
}

/// Convert a per-pollutant parameter map into a vector in canonical feature
/// order. All seven pollutants must be present; unknown keys are rejected.
pub(crate) fn features_from_map(
    map: &BTreeMap<String, f64>,
    what: &str,
) -> Result<Features, ModelError> {
    for key in map.keys() {
        if Pollutant::from_key(key).is_none() {
            return Err(ModelError::Invalid(format!(
                "unknown pollutant in {what}: {key}"
            )));
        }
    }
    let mut values = [0.0; FEATURE_COUNT];
    for (slot, pollutant) in values.iter_mut().zip(Pollutant::ALL) {
        *slot = *map.get(pollutant.key()).ok_or_else(|| {
            ModelError::Invalid(format!("{what} missing pollutant: {}", pollutant.key()))
        })?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn feature_names_pin_the_documented_order() {
        assert_eq!(
            feature_names(),
            ["pm2_5", "pm10", "no2", "so2", "co", "o3", "nh3"]
        );
    }

    #[test]
    fn unknown_model_name_is_invalid() {
        let file = ModelFile {
            model: "gradient_boost".to_string(),
            params: serde_json::json!({}),
        };

        let result = create_model(&file);

        assert!(matches!(result, Err(ModelError::Invalid(_))));
    }

    #[test]
    fn missing_model_file_returns_read_error() {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = temp_dir.join(format!("airindex-model-missing-{unique}.json"));

        let result = load_model_from_path(&path);

        assert!(matches!(result, Err(ModelError::Read(_))));
    }

    #[test]
    fn invalid_json_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("airindex-model-invalid-{unique}.json"));
        fs::write(&path, "{not json")?;

        let result = load_model_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ModelError::Parse(_))));
        Ok(())
    }

    #[test]
    fn linear_v1_file_loads_and_predicts() -> Result<(), Box<dyn std::error::Error>> {
        let temp_dir = std::env::temp_dir();
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = temp_dir.join(format!("airindex-model-v1-{unique}.json"));
        let contents = r#"{
            "model": "linear_v1",
            "params": {
                "intercept": 10.0,
                "coefficients": {
                    "pm2_5": 1.0, "pm10": 0.5, "no2": 0.0, "so2": 0.0,
                    "co": 0.0, "o3": 0.0, "nh3": 0.0
                }
            }
        }"#;
        fs::write(&path, contents)?;

        let model = load_model_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(model.name(), "linear_v1");
        let features = [40.0, 100.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(model.predict(&features), 10.0 + 40.0 + 50.0);
        Ok(())
    }
}
