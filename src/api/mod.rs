use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::{Arc, RwLock};

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .route("/api/predict", post(handlers::post_predict))
        .route("/api/predict/batch", post(handlers::post_predict_batch))
        .route("/api/health", get(handlers::get_health))
        .route("/api/model", get(handlers::get_model_info))
        .with_state(state)
}
