//! License plate recognition pipeline.
//!
//! This facade re-exports the workspace members: shared contract types
//! from [`common`], the structured logging bootstrap from [`telemetry`],
//! and the recognition pipeline itself from [`recognition`].

pub use common;
pub use recognition;
pub use telemetry;

pub use common::{
    CollapseMode, CountryCode, DetectedPlate, Frame, FrameBuffer, PixelFormat, PlateFormat,
    RecognizerConfig, ValidationResult,
};
pub use recognition::{
    EmptyReason, InferenceEngine, PlateRecognizer, PlateValidator, RecognitionOutcome,
};
