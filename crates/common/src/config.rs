use crate::plate::CountryCode;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Class ordering the recognition model was trained with. Index 36 is the
/// dash separator, index 37 the space separator; both are stripped during
/// text normalization.
pub const DEFAULT_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ- ";

/// How the decoder collapses repeated characters across timesteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseMode {
    /// Compare against the last character actually accepted into the
    /// output. Guarantees the decoded text never contains two identical
    /// adjacent characters.
    Accepted,
    /// Compare against the previous timestep's raw argmax class
    /// (CTC-style). A sub-threshold timestep between two identical argmax
    /// classes separates them, so decoded text CAN contain identical
    /// adjacent characters under this mode.
    RawClass,
}

impl Default for CollapseMode {
    fn default() -> Self {
        Self::Accepted
    }
}

/// Recognition pipeline configuration.
///
/// A recognizer takes a snapshot of this at the start of every call, so a
/// concurrent replacement never affects an in-flight recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Minimum per-timestep score for a character to be accepted (0.0 to 1.0).
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Country whose plate grammars are enforced.
    #[serde(default)]
    pub country: CountryCode,

    /// Ordered class-to-character mapping; must match the model's class count.
    #[serde(default = "default_charset")]
    pub charset: String,

    /// Minimum interval between recognition attempt starts.
    #[serde(default = "default_recognition_interval_ms")]
    pub recognition_interval_ms: u64,

    /// Deadline for a single inference call.
    #[serde(default = "default_inference_timeout_ms")]
    pub inference_timeout_ms: u64,

    /// Duplicate-collapsing semantics for the decoder.
    #[serde(default)]
    pub collapse_mode: CollapseMode,
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_charset() -> String {
    DEFAULT_CHARSET.to_string()
}

fn default_recognition_interval_ms() -> u64 {
    500
}

fn default_inference_timeout_ms() -> u64 {
    5000
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            country: CountryCode::default(),
            charset: default_charset(),
            recognition_interval_ms: default_recognition_interval_ms(),
            inference_timeout_ms: default_inference_timeout_ms(),
            collapse_mode: CollapseMode::default(),
        }
    }
}

impl RecognizerConfig {
    /// Apply `PLATESCAN_*` environment variable overrides on top of the
    /// current values. Unparsable values are logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = env::var("PLATESCAN_COUNTRY") {
            match CountryCode::from_str(&raw) {
                Ok(country) => self.country = country,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring PLATESCAN_COUNTRY"),
            }
        }
        if let Ok(raw) = env::var("PLATESCAN_CONFIDENCE_THRESHOLD") {
            match raw.parse::<f32>() {
                Ok(v) if (0.0..=1.0).contains(&v) => self.confidence_threshold = v,
                _ => {
                    tracing::warn!(value = %raw, "ignoring PLATESCAN_CONFIDENCE_THRESHOLD")
                }
            }
        }
        if let Ok(raw) = env::var("PLATESCAN_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(v) => self.recognition_interval_ms = v,
                Err(_) => tracing::warn!(value = %raw, "ignoring PLATESCAN_INTERVAL_MS"),
            }
        }
    }

    /// True when every charset character appears exactly once. Decode and
    /// checksum both depend on an unambiguous position-to-index mapping.
    pub fn has_unique_charset(&self) -> bool {
        let chars: Vec<char> = self.charset.chars().collect();
        chars
            .iter()
            .enumerate()
            .all(|(i, c)| !chars[..i].contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = RecognizerConfig::default();
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.country, CountryCode::Cl);
        assert_eq!(config.charset, DEFAULT_CHARSET);
        assert_eq!(config.recognition_interval_ms, 500);
        assert_eq!(config.inference_timeout_ms, 5000);
        assert_eq!(config.collapse_mode, CollapseMode::Accepted);
    }

    #[test]
    fn default_charset_is_unique() {
        assert!(RecognizerConfig::default().has_unique_charset());
        let config = RecognizerConfig {
            charset: "AAB".to_string(),
            ..Default::default()
        };
        assert!(!config.has_unique_charset());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: RecognizerConfig =
            serde_json::from_str(r#"{"country":"AR","confidence_threshold":0.6}"#).unwrap();
        assert_eq!(config.country, CountryCode::Ar);
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.recognition_interval_ms, 500);
    }

    #[test]
    fn env_overrides_apply_and_reject_garbage() {
        std::env::set_var("PLATESCAN_COUNTRY", "mx");
        std::env::set_var("PLATESCAN_CONFIDENCE_THRESHOLD", "1.5");
        std::env::set_var("PLATESCAN_INTERVAL_MS", "250");

        let mut config = RecognizerConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.country, CountryCode::Mx);
        // Out-of-range threshold is ignored.
        assert_eq!(config.confidence_threshold, 0.7);
        assert_eq!(config.recognition_interval_ms, 250);

        std::env::remove_var("PLATESCAN_COUNTRY");
        std::env::remove_var("PLATESCAN_CONFIDENCE_THRESHOLD");
        std::env::remove_var("PLATESCAN_INTERVAL_MS");
    }
}
