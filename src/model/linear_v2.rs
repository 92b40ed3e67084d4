//! Linear V2 predictor: regression over z-score standardized features.
//!
//! Formula: `aqi = intercept + Σ weight_i * (feature_i - mean_i) / std_i`
//!
//! This is the export target for an offline training pipeline with a scaler
//! step: the scaler's per-feature means and standard deviations ride along
//! with the regression weights.

use crate::model::{features_from_map, AqiPredictor, Features, ModelError};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Linear V2 parameters as they appear in the model file.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearV2Params {
    pub intercept: f64,
    /// Per-pollutant regression weights in standardized feature space.
    pub coefficients: BTreeMap<String, f64>,
    /// Per-pollutant means from the training scaler.
    pub means: BTreeMap<String, f64>,
    /// Per-pollutant standard deviations from the training scaler.
    pub stds: BTreeMap<String, f64>,
}

/// Linear V2 predictor.
#[derive(Debug)]
pub struct LinearV2Model {
    intercept: f64,
    weights: Features,
    means: Features,
    stds: Features,
}

impl LinearV2Model {
    pub fn from_params(params: &LinearV2Params) -> Result<Self, ModelError> {
        let stds = features_from_map(&params.stds, "stds")?;
        if let Some(bad) = stds.iter().find(|std| !std.is_finite() || **std <= 0.0) {
            return Err(ModelError::Invalid(format!(
                "stds must be positive and finite, got {bad}"
            )));
        }
        Ok(Self {
            intercept: params.intercept,
            weights: features_from_map(&params.coefficients, "coefficients")?,
            means: features_from_map(&params.means, "means")?,
            stds,
        })
    }
}

impl AqiPredictor for LinearV2Model {
    fn predict(&self, features: &Features) -> f64 {
        let mut total = self.intercept;
        for index in 0..features.len() {
            let standardized = (features[index] - self.means[index]) / self.stds[index];
            total += self.weights[index] * standardized;
        }
        total
    }

    fn name(&self) -> &'static str {
        "linear_v2"
    }
}
