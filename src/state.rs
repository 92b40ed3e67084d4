use crate::model::AqiPredictor;
use std::sync::Arc;

/// Shared service state: the predictor loaded at startup.
///
/// The predictor is set once before serving begins and only read afterwards;
/// handlers clone the `Arc` out of a short-lived read guard.
#[derive(Debug, Default)]
pub struct AppState {
    predictor: Option<Arc<dyn AqiPredictor>>,
}

impl AppState {
    pub fn new() -> Self {
        Self { predictor: None }
    }

    pub fn predictor(&self) -> Option<&Arc<dyn AqiPredictor>> {
        self.predictor.as_ref()
    }

    pub fn set_predictor(&mut self, predictor: Arc<dyn AqiPredictor>) {
        self.predictor = Some(predictor);
    }
}
