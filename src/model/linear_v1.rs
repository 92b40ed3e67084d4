//! Linear V1 predictor: regression over raw pollutant features.
//!
//! Formula: `aqi = intercept + Σ weight_i * feature_i`

use crate::model::{features_from_map, AqiPredictor, Features, ModelError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Linear V1 parameters as they appear in the model file.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearV1Params {
    pub intercept: f64,
    /// Per-pollutant regression weights, keyed by wire name.
    pub coefficients: BTreeMap<String, f64>,
}

/// Linear V1 predictor.
#[derive(Debug)]
pub struct LinearV1Model {
    intercept: f64,
    weights: Features,
}

impl LinearV1Model {
    pub fn from_params(params: &LinearV1Params) -> Result<Self, ModelError> {
        Ok(Self {
            intercept: params.intercept,
            weights: features_from_map(&params.coefficients, "coefficients")?,
        })
    }
}

impl AqiPredictor for LinearV1Model {
    fn predict(&self, features: &Features) -> f64 {
        self.intercept
            + self
                .weights
                .iter()
                .zip(features)
                .map(|(weight, feature)| weight * feature)
                .sum::<f64>()
    }

    fn name(&self) -> &'static str {
        "linear_v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Pollutant;

    fn coefficient_map(values: [f64; 7]) -> BTreeMap<String, f64> {
        Pollutant::ALL
            .iter()
            .zip(values)
            .map(|(pollutant, value)| (pollutant.key().to_string(), value))
            .collect()
    }

    #[test]
    fn predict_applies_weights_in_feature_order() {
        let params = LinearV1Params {
            intercept: 1.0,
            coefficients: coefficient_map([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
        };
        let model = LinearV1Model::from_params(&params).expect("valid params");

        // Each feature slot gets a distinct weight, so any reordering of the
        // feature vector changes the result.
        let prediction = model.predict(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(prediction, 2.0);

        let prediction = model.predict(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(prediction, 8.0);
    }

    #[test]
    fn missing_coefficient_is_invalid() {
        let mut coefficients = coefficient_map([1.0; 7]);
        coefficients.remove("so2");
        let params = LinearV1Params {
            intercept: 0.0,
            coefficients,
        };

        let result = LinearV1Model::from_params(&params);

        assert!(matches!(result, Err(ModelError::Invalid(message)) if message.contains("so2")));
    }

    #[test]
    fn unknown_coefficient_key_is_invalid() {
        let mut coefficients = coefficient_map([1.0; 7]);
        coefficients.insert("benzene".to_string(), 2.0);
        let params = LinearV1Params {
            intercept: 0.0,
            coefficients,
        };

        let result = LinearV1Model::from_params(&params);

        assert!(matches!(result, Err(ModelError::Invalid(message)) if message.contains("benzene")));
    }
}
