//! Shared contract types for the platescan recognition pipeline.
//!
//! This crate defines the data that crosses component boundaries: raw video
//! frames, plate/country contracts, the recognizer configuration, and safe
//! time helpers. It carries no pipeline logic of its own.

pub mod config;
pub mod frame;
pub mod plate;
pub mod time;

pub use config::{CollapseMode, RecognizerConfig, DEFAULT_CHARSET};
pub use frame::{Frame, FrameBuffer, PixelFormat};
pub use plate::{CountryCode, DetectedPlate, PlateFormat, ValidationResult};
