//! Scriptable predictor for deterministic orchestration tests.

use crate::model::{AqiPredictor, Features};
use std::sync::Mutex;

/// Mock predictor returning scripted outputs in call order, repeating the
/// last one once the script is exhausted.
///
/// The interior mutex serializes access the way a predictor without internal
/// thread-safety would have to, and doubles as the call counter used to
/// assert that validation failures never reach the predictor.
#[derive(Debug)]
pub struct MockPredictor {
    outputs: Vec<f64>,
    calls: Mutex<usize>,
}

impl MockPredictor {
    pub fn returning(value: f64) -> Self {
        Self::sequence(vec![value])
    }

    pub fn sequence(outputs: Vec<f64>) -> Self {
        Self {
            outputs,
            calls: Mutex::new(0),
        }
    }

    /// A predictor whose output is unusable, for the internal-error path.
    pub fn non_finite() -> Self {
        Self::returning(f64::NAN)
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AqiPredictor for MockPredictor {
    fn predict(&self, _features: &Features) -> f64 {
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = (*calls).min(self.outputs.len().saturating_sub(1));
        *calls += 1;
        self.outputs.get(index).copied().unwrap_or(f64::NAN)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
