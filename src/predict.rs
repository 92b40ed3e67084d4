//! Prediction orchestration: validate a raw reading, invoke the predictor,
//! post-process and classify.

use crate::error::{PredictionError, ValidationError};
use crate::index::Pollutant;
use crate::index::category::Category;
use crate::model::{AqiPredictor, FEATURE_COUNT, Features};
use serde_json::{Map, Value};

/// Result of one prediction, before wire assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub aqi: u32,
    pub category: Category,
}

/// Validate a raw reading into a feature vector in canonical order.
///
/// Fields are checked in [`Pollutant::ALL`] order and the first missing
/// field is named. A value is numeric if it is a JSON number or a string
/// parsing as a finite float; everything else is a client fault.
pub fn validate_reading(raw: &Map<String, Value>) -> Result<Features, ValidationError> {
    let mut features = [0.0; FEATURE_COUNT];
    for (slot, pollutant) in features.iter_mut().zip(Pollutant::ALL) {
        let field = pollutant.key();
        let value = raw.get(field).ok_or(ValidationError::MissingField(field))?;
        *slot = numeric_value(field, value)?;
    }
    Ok(features)
}

fn numeric_value(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() => Ok(number),
        _ => Err(ValidationError::NotNumeric {
            field,
            value: value.to_string(),
        }),
    }
}

/// Run one raw reading through validation, the predictor and classification.
///
/// Validation failures never reach the predictor. The raw prediction is
/// rounded to the nearest integer (half away from zero), then clamped to
/// zero. A non-finite predictor output is surfaced as an internal error,
/// distinct from any client fault.
pub fn predict_one(
    predictor: &dyn AqiPredictor,
    raw: &Map<String, Value>,
) -> Result<Prediction, PredictionError> {
    let features = validate_reading(raw)?;
    let predicted = predictor.predict(&features);
    if !predicted.is_finite() {
        return Err(PredictionError::Internal(format!(
            "predictor {} returned a non-finite value",
            predictor.name()
        )));
    }
    let aqi = predicted.round().max(0.0) as u32;
    Ok(Prediction {
        aqi,
        category: Category::for_aqi(aqi),
    })
}

/// Run an ordered batch of raw readings through [`predict_one`].
///
/// Every entry passes the same validation as the single path; the batch
/// fails atomically on the first invalid entry, naming its index. Result
/// order matches input order.
pub fn predict_many(
    predictor: &dyn AqiPredictor,
    readings: &[Value],
) -> Result<Vec<Prediction>, PredictionError> {
    let mut predictions = Vec::with_capacity(readings.len());
    for (index, entry) in readings.iter().enumerate() {
        let raw = entry
            .as_object()
            .ok_or_else(|| ValidationError::EntryInvalid {
                index,
                reason: ValidationError::NotAnObject.to_string(),
            })?;
        let prediction = predict_one(predictor, raw).map_err(|error| match error {
            PredictionError::Validation(inner) => {
                PredictionError::Validation(ValidationError::EntryInvalid {
                    index,
                    reason: inner.to_string(),
                })
            }
            other => other,
        })?;
        predictions.push(prediction);
    }
    Ok(predictions)
}
