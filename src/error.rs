use thiserror::Error;

/// Client-input faults detected before the predictor is invoked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("expected a JSON object of pollutant concentrations")]
    NotAnObject,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for field {field}: {value}")]
    NotNumeric { field: &'static str, value: String },
    #[error("reading {index}: {reason}")]
    EntryInvalid { index: usize, reason: String },
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("prediction failed: {0}")]
    Internal(String),
}
