//! ONNX Runtime backend for the recognition model.

use super::{InferenceEngine, InputDtype, InputSpec};
use crate::error::EngineError;
use crate::preprocess::{BufferData, NormalizedBuffer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ndarray::{Array, Array3, IxDyn};
use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxConfig {
    /// Path to the OCR ONNX model file
    pub model_path: String,

    /// Model input width
    #[serde(default = "default_input_width")]
    pub input_width: u32,

    /// Model input height
    #[serde(default = "default_input_height")]
    pub input_height: u32,

    /// Number of intra-operation threads
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,

    /// Number of inter-operation threads
    #[serde(default = "default_inter_threads")]
    pub inter_threads: usize,
}

fn default_input_width() -> u32 {
    100
}

fn default_input_height() -> u32 {
    32
}

fn default_intra_threads() -> usize {
    4
}

fn default_inter_threads() -> usize {
    1
}

impl Default for OnnxConfig {
    fn default() -> Self {
        Self {
            model_path: "models/license_plates_ocr_model.onnx".to_string(),
            input_width: default_input_width(),
            input_height: default_input_height(),
            intra_threads: default_intra_threads(),
            inter_threads: default_inter_threads(),
        }
    }
}

/// CPU-backed ONNX Runtime session around the recognition model.
///
/// The model's input contract is `[1,1,H,W]` float32 in `[0,1]`; the
/// output is reshaped to the `[T,1,C]` score matrix the decoder expects.
pub struct OnnxEngine {
    config: OnnxConfig,
    session: Arc<Mutex<Session>>,
}

impl OnnxEngine {
    /// Load the model session. Fails when the model file is missing or
    /// not a valid ONNX graph.
    pub fn load(config: OnnxConfig) -> Result<Self> {
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set optimization level")?
            .with_intra_threads(config.intra_threads)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set intra threads")?
            .with_inter_threads(config.inter_threads)
            .map_err(ort::Error::<()>::from)
            .context("Failed to set inter threads")?
            .commit_from_file(&config.model_path)
            .with_context(|| format!("Failed to load model from {}", config.model_path))?;

        tracing::info!(
            model_path = %config.model_path,
            input_width = config.input_width,
            input_height = config.input_height,
            "OCR model loaded"
        );

        Ok(Self {
            config,
            session: Arc::new(Mutex::new(session)),
        })
    }
}

#[async_trait]
impl InferenceEngine for OnnxEngine {
    fn input_spec(&self) -> InputSpec {
        InputSpec {
            width: self.config.input_width,
            height: self.config.input_height,
            dtype: InputDtype::Float32,
        }
    }

    fn is_ready(&self) -> bool {
        true
    }

    async fn infer(&self, input: &NormalizedBuffer) -> Result<Array3<f32>, EngineError> {
        let data = match &input.data {
            BufferData::F32(values) => values.clone(),
            BufferData::U8(_) => {
                return Err(EngineError::InvalidInput(
                    "engine declares float32 input but received uint8".to_string(),
                ))
            }
        };

        let height = input.height as usize;
        let width = input.width as usize;
        if data.len() != height * width {
            return Err(EngineError::InvalidInput(format!(
                "buffer has {} elements, expected {}",
                data.len(),
                height * width
            )));
        }

        let session = Arc::clone(&self.session);
        // The ONNX call is blocking; keep it off the async runtime.
        tokio::task::spawn_blocking(move || -> Result<Array3<f32>, EngineError> {
            let array = Array::from_shape_vec(IxDyn(&[1, 1, height, width]), data)
                .map_err(EngineError::Shape)?;
            let input_tensor = Value::from_array(array)?;

            let mut session = session.lock().unwrap_or_else(|e| e.into_inner());
            let outputs = session.run(ort::inputs![input_tensor])?;

            // Different OCR exports name the logits tensor differently.
            let output_value = outputs
                .get("output")
                .or_else(|| outputs.get("output0"))
                .or_else(|| outputs.get("logits"))
                .ok_or(EngineError::MissingOutput)?;
            let (shape, scores) = output_value.try_extract_tensor::<f32>()?;

            let dims: Vec<usize> = shape.as_ref().iter().map(|&d| d as usize).collect();
            to_score_matrix(&dims, scores.to_vec())
        })
        .await?
    }
}

/// Reshape a raw output tensor to `[T,1,C]`. A batch-first `[1,T,C]`
/// layout has the same linear order, so both are accepted.
fn to_score_matrix(dims: &[usize], data: Vec<f32>) -> Result<Array3<f32>, EngineError> {
    match dims {
        [t, 1, c] => Ok(Array3::from_shape_vec((*t, 1, *c), data)?),
        [1, t, c] => Ok(Array3::from_shape_vec((*t, 1, *c), data)?),
        other => Err(EngineError::OutputShape(other.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_model_contract() {
        let config = OnnxConfig::default();
        assert_eq!(config.input_width, 100);
        assert_eq!(config.input_height, 32);
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.inter_threads, 1);
    }

    #[test]
    fn load_fails_gracefully_for_missing_model() {
        let config = OnnxConfig {
            model_path: "/nonexistent/model.onnx".to_string(),
            ..Default::default()
        };
        assert!(OnnxEngine::load(config).is_err());
    }

    #[test]
    fn score_matrix_accepts_both_batch_layouts() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let a = to_score_matrix(&[4, 1, 3], data.clone()).unwrap();
        let b = to_score_matrix(&[1, 4, 3], data).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dim(), (4, 1, 3));

        assert!(matches!(
            to_score_matrix(&[2, 3], vec![0.0; 6]),
            Err(EngineError::OutputShape(_))
        ));
    }
}
