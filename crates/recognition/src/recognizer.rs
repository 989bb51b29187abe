//! The recognition entry point: ties preprocess, inference, decode, and
//! validation together and enforces the boundary rules (single flight,
//! throttling, inference deadline, config snapshots).

use crate::decode;
use crate::engine::InferenceEngine;
use crate::history::{DetectionHistory, HistoryEntry};
use crate::normalize;
use crate::preprocess;
use crate::stats::PerformanceTracker;
use crate::validate::PlateValidator;
use common::time::safe_unix_timestamp;
use common::{DetectedPlate, Frame, RecognizerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::time::timeout;
use uuid::Uuid;

/// Why a recognition attempt produced no plate. Nothing here is fatal;
/// the caller simply moves on to a later frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The engine is not loaded or reports itself unavailable.
    EngineNotReady,
    /// A previous attempt started less than the configured interval ago.
    Throttled,
    /// Another recognition is still in flight; the frame was dropped.
    Busy,
    /// The frame failed preprocessing and was skipped.
    BadFrame,
    /// The engine returned an error.
    InferenceFailed,
    /// The inference deadline elapsed; the call was abandoned.
    Timeout,
    /// The score matrix violated the decoder contract.
    DecodeFailed,
    /// Decoding produced no text that cleared the confidence bars.
    LowConfidence,
    /// The decoded text did not validate as a plate.
    NoMatch,
}

/// Result of a single `recognize` call.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    Detected(DetectedPlate),
    Empty(EmptyReason),
}

impl RecognitionOutcome {
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }
}

/// Synchronous, stateless-per-frame plate recognizer.
///
/// The only state carried across calls is the shared configuration, the
/// throttle clock, and the bookkeeping (history, stats). Config updates
/// swap atomically; an in-flight recognition keeps the snapshot it
/// started with.
pub struct PlateRecognizer {
    engine: Arc<dyn InferenceEngine>,
    config: Mutex<Arc<RecognizerConfig>>,
    busy: AtomicBool,
    last_attempt: Mutex<Option<Instant>>,
    history: Mutex<DetectionHistory>,
    stats: Mutex<PerformanceTracker>,
}

impl PlateRecognizer {
    pub fn new(engine: Arc<dyn InferenceEngine>, config: RecognizerConfig) -> Self {
        Self {
            engine,
            config: Mutex::new(Arc::new(config)),
            busy: AtomicBool::new(false),
            last_attempt: Mutex::new(None),
            history: Mutex::new(DetectionHistory::default()),
            stats: Mutex::new(PerformanceTracker::new()),
        }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<RecognizerConfig> {
        Arc::clone(&lock(&self.config))
    }

    /// Replace the configuration. Takes effect for the next recognition;
    /// an in-flight call keeps the snapshot it started with.
    pub fn update_config(&self, config: RecognizerConfig) {
        *lock(&self.config) = Arc::new(config);
    }

    /// Recognize a plate in one frame.
    ///
    /// At most one recognition runs at a time; a frame arriving while one
    /// is pending is dropped, not queued. Attempts start at most once per
    /// configured interval. All pipeline failures are recovered here and
    /// surfaced as an [`EmptyReason`].
    pub async fn recognize(&self, frame: &Frame<'_>) -> RecognitionOutcome {
        let config = self.config();

        if !self.engine.is_ready() {
            tracing::debug!("inference engine not ready, skipping frame");
            return RecognitionOutcome::Empty(EmptyReason::EngineNotReady);
        }

        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!("recognition in flight, dropping frame");
            return RecognitionOutcome::Empty(EmptyReason::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let interval = Duration::from_millis(config.recognition_interval_ms);
        {
            let mut last = lock(&self.last_attempt);
            if let Some(started) = *last {
                if started.elapsed() < interval {
                    return RecognitionOutcome::Empty(EmptyReason::Throttled);
                }
            }
            *last = Some(Instant::now());
        }

        let started = Instant::now();
        let outcome = self.run_pipeline(frame, &config).await;

        lock(&self.stats).record(started.elapsed(), outcome.is_detected());
        if let RecognitionOutcome::Detected(plate) = &outcome {
            lock(&self.history).add(plate.text.clone(), plate.score, plate.timestamp);
            tracing::info!(
                plate = %plate.text,
                score = plate.score,
                format = ?plate.format,
                "plate detected"
            );
        }
        outcome
    }

    async fn run_pipeline(
        &self,
        frame: &Frame<'_>,
        config: &RecognizerConfig,
    ) -> RecognitionOutcome {
        let spec = self.engine.input_spec();
        let buffer = match preprocess::normalize(frame, &spec) {
            Ok(buffer) => buffer,
            Err(e) => {
                tracing::warn!(error = %e, "frame rejected by preprocessing");
                return RecognitionOutcome::Empty(EmptyReason::BadFrame);
            }
        };

        let deadline = Duration::from_millis(config.inference_timeout_ms);
        let scores = match timeout(deadline, self.engine.infer(&buffer)).await {
            Err(_) => {
                tracing::warn!(timeout_ms = config.inference_timeout_ms, "inference timed out");
                return RecognitionOutcome::Empty(EmptyReason::Timeout);
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, "inference failed");
                return RecognitionOutcome::Empty(EmptyReason::InferenceFailed);
            }
            Ok(Ok(scores)) => scores,
        };

        let decoded = match decode::decode(
            &scores,
            &config.charset,
            config.confidence_threshold,
            config.collapse_mode,
        ) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::error!(error = %e, "score matrix rejected");
                return RecognitionOutcome::Empty(EmptyReason::DecodeFailed);
            }
        };
        if decoded.text.is_empty() {
            return RecognitionOutcome::Empty(EmptyReason::LowConfidence);
        }

        let cleaned = normalize::clean(&decoded.text);
        let validator = PlateValidator::new(config.country);
        let validation = validator.validate(&cleaned);
        if !validation.is_valid {
            tracing::debug!(text = %cleaned, "decoded text is not a valid plate");
            return RecognitionOutcome::Empty(EmptyReason::NoMatch);
        }

        let score = validator.score(&cleaned, decoded.mean_confidence * 100.0);
        RecognitionOutcome::Detected(DetectedPlate {
            display_text: normalize::format_plate(&cleaned),
            text: cleaned,
            format: validation.format,
            decode_confidence: decoded.mean_confidence,
            score,
            timestamp: safe_unix_timestamp(),
        })
    }

    /// Snapshot of the detection history, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        lock(&self.history).entries().cloned().collect()
    }

    pub fn mark_consulted(&self, id: Uuid) -> bool {
        lock(&self.history).mark_consulted(id)
    }

    pub fn clear_history(&self) {
        lock(&self.history).clear();
    }

    pub fn export_history_json(&self) -> anyhow::Result<String> {
        lock(&self.history).export_json()
    }

    /// Rolling average attempt duration and hit rate.
    pub fn stats(&self) -> (Duration, f32) {
        let stats = lock(&self.stats);
        (stats.average_processing_time(), stats.hit_rate())
    }
}

/// Clears the single-flight flag when the attempt finishes, including on
/// early returns.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
