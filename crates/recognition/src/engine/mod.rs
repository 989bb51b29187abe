//! Narrow abstraction over the external character-recognition model.
//!
//! The pipeline only ever sees a function from normalized buffer to score
//! matrix; session management stays inside the backend. [`MockEngine`]
//! substitutes scripted matrices for tests.

pub mod mock;
pub mod onnx;

use crate::error::EngineError;
use crate::preprocess::NormalizedBuffer;
use async_trait::async_trait;
use ndarray::Array3;
use serde::{Deserialize, Serialize};

pub use mock::MockEngine;
pub use onnx::{OnnxConfig, OnnxEngine};

/// Numeric representation the engine expects for its input tensor. The
/// engine's declaration is authoritative; preprocessing produces exactly
/// this representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputDtype {
    /// `f32` values in `[0, 1]`.
    Float32,
    /// `u8` values in `[0, 255]`.
    Uint8,
}

/// Input contract of a loaded model: a `[1,1,height,width]` tensor of the
/// declared dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub width: u32,
    pub height: u32,
    pub dtype: InputDtype,
}

impl InputSpec {
    /// Element count of a conforming input buffer.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A character-recognition model backend.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// The input contract this engine's model was exported with.
    fn input_spec(&self) -> InputSpec;

    /// Whether the engine can currently serve inference calls. A recognizer
    /// treats a not-ready engine as an empty result, never as an error.
    fn is_ready(&self) -> bool;

    /// Run the model on a normalized buffer, returning per-timestep class
    /// scores with shape `[T, 1, C]`.
    async fn infer(&self, input: &NormalizedBuffer) -> Result<Array3<f32>, EngineError>;
}
