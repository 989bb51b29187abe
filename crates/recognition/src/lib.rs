//! Post-inference license plate recognition pipeline.
//!
//! The pipeline runs strictly forward: a raw frame is normalized to the
//! model's input contract ([`preprocess`]), the model's score matrix is
//! greedily decoded ([`decode`]), the provisional text is cleaned
//! ([`normalize`]) and matched against country plate grammars
//! ([`validate`]). [`PlateRecognizer`] ties the stages together around an
//! [`engine::InferenceEngine`], enforcing the single-flight, throttle, and
//! timeout rules at the boundary. No stage keeps state across frames.

pub mod decode;
pub mod engine;
pub mod error;
pub mod history;
pub mod normalize;
pub mod preprocess;
pub mod recognizer;
pub mod stats;
pub mod validate;

pub use decode::DecodedText;
pub use engine::{InferenceEngine, InputDtype, InputSpec};
pub use error::{DecodeError, EngineError, PreprocessError};
pub use history::{DetectionHistory, HistoryEntry};
pub use preprocess::NormalizedBuffer;
pub use recognizer::{EmptyReason, PlateRecognizer, RecognitionOutcome};
pub use stats::PerformanceTracker;
pub use validate::PlateValidator;
