use thiserror::Error;

/// A frame that cannot be normalized. The caller skips the frame; nothing
/// is retried.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("frame has a zero dimension ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },

    #[error("pixel data too short: need {expected} bytes, got {actual}")]
    TruncatedPixels { expected: usize, actual: usize },
}

/// A score matrix that violates the decoder's input contract.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("score matrix has {classes} classes but the charset has {charset} characters")]
    ClassCountMismatch { classes: usize, charset: usize },

    #[error("score matrix batch dimension is {0}, expected 1")]
    BatchWidth(usize),
}

/// Failures raised by an inference engine backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("inference engine is not ready")]
    NotReady,

    #[error("input buffer does not match the declared input spec: {0}")]
    InvalidInput(String),

    #[error("no output tensor found (tried: output, output0, logits)")]
    MissingOutput,

    #[error("unexpected output shape {0:?}, expected [T,1,C]")]
    OutputShape(Vec<usize>),

    #[error("onnx runtime error: {0}")]
    Session(#[from] ort::Error),

    #[error("output reshape failed: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("inference worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
