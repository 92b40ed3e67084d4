use crate::api::responses::{
    BatchPrediction, BatchSuccessResponse, HealthErrorCode, HealthErrorResponse, HealthStatus,
    HealthSuccessResponse, ModelInfoErrorCode, ModelInfoErrorResponse, ModelInfoSuccessResponse,
    PredictErrorCode, PredictErrorResponse, PredictSuccessResponse,
};
use crate::error::{PredictionError, ValidationError};
use crate::model::{AqiPredictor, FEATURE_COUNT, feature_names};
use crate::predict;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
const PREDICTION_FAILED_MESSAGE: &str = "Prediction failed";
const MODEL_UNAVAILABLE_MESSAGE: &str = "No model loaded";

#[derive(Debug)]
enum TimestampError {
    Format(time::error::Format),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Format(err) => write!(f, "timestamp format error: {err}"),
        }
    }
}

fn format_timestamp(timestamp: SystemTime) -> Result<String, TimestampError> {
    let datetime = OffsetDateTime::from(timestamp);
    datetime.format(&Rfc3339).map_err(TimestampError::Format)
}

/// Timestamp for error bodies; falls back to the current time, then to the
/// epoch, so an error response never fails to build.
fn error_timestamp(timestamp: SystemTime) -> String {
    format_timestamp(timestamp).unwrap_or_else(|err| {
        error!(error = %err, "Failed to format error timestamp");
        OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
    })
}

fn shared_predictor(
    state: &Arc<RwLock<AppState>>,
) -> Result<Option<Arc<dyn AqiPredictor>>, &'static str> {
    match state.read() {
        Ok(guard) => Ok(guard.predictor().cloned()),
        Err(_) => Err("state lock poisoned while reading predictor"),
    }
}

// Single prediction

pub enum PredictResponse {
    Success(PredictSuccessResponse),
    Error {
        status: StatusCode,
        body: PredictErrorResponse,
    },
}

impl IntoResponse for PredictResponse {
    fn into_response(self) -> Response {
        match self {
            PredictResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            PredictResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_predict(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    build_predict_response(state, body, SystemTime::now())
}

fn build_predict_response(
    state: Arc<RwLock<AppState>>,
    body: Value,
    now: SystemTime,
) -> PredictResponse {
    let predictor = match shared_predictor(&state) {
        Ok(Some(predictor)) => predictor,
        Ok(None) => {
            return predict_error(
                StatusCode::SERVICE_UNAVAILABLE,
                PredictErrorCode::ModelUnavailable,
                MODEL_UNAVAILABLE_MESSAGE.to_string(),
                now,
            );
        }
        Err(message) => return predict_internal_error(message, now),
    };

    let Some(raw) = body.as_object() else {
        return predict_error(
            StatusCode::BAD_REQUEST,
            PredictErrorCode::ValidationError,
            ValidationError::NotAnObject.to_string(),
            now,
        );
    };

    match predict::predict_one(predictor.as_ref(), raw) {
        Ok(prediction) => match format_timestamp(now) {
            Ok(timestamp) => PredictResponse::Success(PredictSuccessResponse {
                predicted_aqi: prediction.aqi,
                category: prediction.category.label().to_string(),
                color: prediction.category.color().to_string(),
                description: prediction.category.description().to_string(),
                input_pollutants: body.clone(),
                timestamp,
            }),
            Err(_) => predict_internal_error("timestamp formatting failure", now),
        },
        Err(PredictionError::Validation(validation)) => predict_error(
            StatusCode::BAD_REQUEST,
            PredictErrorCode::ValidationError,
            validation.to_string(),
            now,
        ),
        Err(PredictionError::Internal(detail)) => {
            error!(detail = %detail, "Prediction failed while handling /api/predict");
            predict_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                PredictErrorCode::PredictionFailed,
                PREDICTION_FAILED_MESSAGE.to_string(),
                now,
            )
        }
    }
}

fn predict_error(
    status: StatusCode,
    error_code: PredictErrorCode,
    error_message: String,
    now: SystemTime,
) -> PredictResponse {
    PredictResponse::Error {
        status,
        body: PredictErrorResponse {
            error_code,
            error_message,
            timestamp: error_timestamp(now),
        },
    }
}

fn predict_internal_error(message: &str, now: SystemTime) -> PredictResponse {
    error!(
        message = message,
        "Internal error while handling /api/predict"
    );
    predict_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        PredictErrorCode::InternalError,
        INTERNAL_ERROR_MESSAGE.to_string(),
        now,
    )
}

// Batch prediction

pub enum BatchResponse {
    Success(BatchSuccessResponse),
    Error {
        status: StatusCode,
        body: PredictErrorResponse,
    },
}

impl IntoResponse for BatchResponse {
    fn into_response(self) -> Response {
        match self {
            BatchResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            BatchResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_predict_batch(
    State(state): State<Arc<RwLock<AppState>>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    build_batch_response(state, body, SystemTime::now())
}

fn build_batch_response(
    state: Arc<RwLock<AppState>>,
    body: Value,
    now: SystemTime,
) -> BatchResponse {
    let predictor = match shared_predictor(&state) {
        Ok(Some(predictor)) => predictor,
        Ok(None) => {
            return batch_error(
                StatusCode::SERVICE_UNAVAILABLE,
                PredictErrorCode::ModelUnavailable,
                MODEL_UNAVAILABLE_MESSAGE.to_string(),
                now,
            );
        }
        Err(message) => return batch_internal_error(message, now),
    };

    let Some(readings) = body.get("readings").and_then(Value::as_array) else {
        return batch_error(
            StatusCode::BAD_REQUEST,
            PredictErrorCode::ValidationError,
            "expected 'readings' array in request body".to_string(),
            now,
        );
    };

    match predict::predict_many(predictor.as_ref(), readings) {
        Ok(predictions) => match format_timestamp(now) {
            Ok(timestamp) => BatchResponse::Success(BatchSuccessResponse {
                predictions: predictions
                    .iter()
                    .map(|prediction| BatchPrediction {
                        predicted_aqi: prediction.aqi,
                        category: prediction.category.label().to_string(),
                        color: prediction.category.color().to_string(),
                    })
                    .collect(),
                timestamp,
            }),
            Err(_) => batch_internal_error("timestamp formatting failure", now),
        },
        Err(PredictionError::Validation(validation)) => batch_error(
            StatusCode::BAD_REQUEST,
            PredictErrorCode::ValidationError,
            validation.to_string(),
            now,
        ),
        Err(PredictionError::Internal(detail)) => {
            error!(detail = %detail, "Prediction failed while handling /api/predict/batch");
            batch_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                PredictErrorCode::PredictionFailed,
                PREDICTION_FAILED_MESSAGE.to_string(),
                now,
            )
        }
    }
}

fn batch_error(
    status: StatusCode,
    error_code: PredictErrorCode,
    error_message: String,
    now: SystemTime,
) -> BatchResponse {
    BatchResponse::Error {
        status,
        body: PredictErrorResponse {
            error_code,
            error_message,
            timestamp: error_timestamp(now),
        },
    }
}

fn batch_internal_error(message: &str, now: SystemTime) -> BatchResponse {
    error!(
        message = message,
        "Internal error while handling /api/predict/batch"
    );
    batch_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        PredictErrorCode::InternalError,
        INTERNAL_ERROR_MESSAGE.to_string(),
        now,
    )
}

// Liveness probe

pub enum HealthResponse {
    Success {
        status: StatusCode,
        body: HealthSuccessResponse,
    },
    Error {
        status: StatusCode,
        body: HealthErrorResponse,
    },
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        match self {
            HealthResponse::Success { status, body } => (status, Json(body)).into_response(),
            HealthResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_health_response(state, SystemTime::now())
}

fn build_health_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> HealthResponse {
    let model_loaded = match state.read() {
        Ok(guard) => guard.predictor().is_some(),
        Err(_) => {
            return health_internal_error("state lock poisoned while reading predictor", now);
        }
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => {
            return health_internal_error("timestamp formatting failure", now);
        }
    };

    let (status_code, status) = if model_loaded {
        (StatusCode::OK, HealthStatus::Ok)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Ko)
    };

    HealthResponse::Success {
        status: status_code,
        body: HealthSuccessResponse {
            status,
            model_loaded,
            timestamp,
        },
    }
}

fn health_internal_error(message: &str, now: SystemTime) -> HealthResponse {
    error!(
        message = message,
        "Internal error while handling /api/health"
    );
    HealthResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: HealthErrorResponse {
            error_code: HealthErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: error_timestamp(now),
        },
    }
}

// Model introspection

pub enum ModelInfoResponse {
    Success(ModelInfoSuccessResponse),
    Error {
        status: StatusCode,
        body: ModelInfoErrorResponse,
    },
}

impl IntoResponse for ModelInfoResponse {
    fn into_response(self) -> Response {
        match self {
            ModelInfoResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            ModelInfoResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_model_info(State(state): State<Arc<RwLock<AppState>>>) -> impl IntoResponse {
    build_model_info_response(state, SystemTime::now())
}

fn build_model_info_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> ModelInfoResponse {
    let predictor = match shared_predictor(&state) {
        Ok(Some(predictor)) => predictor,
        Ok(None) => {
            return ModelInfoResponse::Error {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ModelInfoErrorResponse {
                    error_code: ModelInfoErrorCode::ModelUnavailable,
                    error_message: MODEL_UNAVAILABLE_MESSAGE.to_string(),
                    timestamp: error_timestamp(now),
                },
            };
        }
        Err(message) => return model_info_internal_error(message, now),
    };

    let timestamp = match format_timestamp(now) {
        Ok(formatted) => formatted,
        Err(_) => {
            return model_info_internal_error("timestamp formatting failure", now);
        }
    };

    ModelInfoResponse::Success(ModelInfoSuccessResponse {
        model_type: predictor.name().to_string(),
        features: feature_names().iter().map(ToString::to_string).collect(),
        feature_count: FEATURE_COUNT,
        timestamp,
    })
}

fn model_info_internal_error(message: &str, now: SystemTime) -> ModelInfoResponse {
    error!(message = message, "Internal error while handling /api/model");
    ModelInfoResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ModelInfoErrorResponse {
            error_code: ModelInfoErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: error_timestamp(now),
        },
    }
}
