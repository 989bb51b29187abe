//! Scripted inference engine for tests.

use super::{InferenceEngine, InputDtype, InputSpec};
use crate::error::EngineError;
use crate::preprocess::NormalizedBuffer;
use async_trait::async_trait;
use ndarray::Array3;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Test double that returns a scripted score matrix instead of running a
/// model. Readiness and an artificial inference delay are togglable so
/// timeout and single-flight behavior can be exercised deterministically.
pub struct MockEngine {
    spec: InputSpec,
    ready: AtomicBool,
    delay: Mutex<Option<Duration>>,
    scores: Mutex<Array3<f32>>,
}

impl MockEngine {
    pub fn new(scores: Array3<f32>) -> Self {
        Self {
            spec: InputSpec {
                width: 100,
                height: 32,
                dtype: InputDtype::Float32,
            },
            ready: AtomicBool::new(true),
            delay: Mutex::new(None),
            scores: Mutex::new(scores),
        }
    }

    pub fn with_spec(mut self, spec: InputSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *lock(&self.delay) = Some(delay);
        self
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Replace the scripted score matrix for subsequent calls.
    pub fn set_scores(&self, scores: Array3<f32>) {
        *lock(&self.scores) = scores;
    }

    /// Build a score matrix with one dominant class per timestep at `peak`
    /// and every other class at a small floor.
    pub fn dominant_scores(classes: usize, picks: &[usize], peak: f32) -> Array3<f32> {
        let mut scores = Array3::from_elem((picks.len(), 1, classes), 0.01);
        for (t, &c) in picks.iter().enumerate() {
            scores[[t, 0, c]] = peak;
        }
        scores
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl InferenceEngine for MockEngine {
    fn input_spec(&self) -> InputSpec {
        self.spec
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn infer(&self, input: &NormalizedBuffer) -> Result<Array3<f32>, EngineError> {
        if !self.is_ready() {
            return Err(EngineError::NotReady);
        }
        if input.len() != self.spec.len() || input.dtype() != self.spec.dtype {
            return Err(EngineError::InvalidInput(format!(
                "buffer has {} elements of {:?}, spec wants {} of {:?}",
                input.len(),
                input.dtype(),
                self.spec.len(),
                self.spec.dtype
            )));
        }

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(lock(&self.scores).clone())
    }
}
