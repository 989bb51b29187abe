//! Rolling recognition performance counters.

use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 10;

#[derive(Debug, Clone, Copy)]
struct Attempt {
    duration: Duration,
    hit: bool,
}

/// Sliding window over the last few recognition attempts: average
/// processing time and the share of attempts that produced a plate.
#[derive(Debug, Clone, Default)]
pub struct PerformanceTracker {
    attempts: VecDeque<Attempt>,
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, duration: Duration, hit: bool) {
        self.attempts.push_back(Attempt { duration, hit });
        while self.attempts.len() > WINDOW {
            self.attempts.pop_front();
        }
    }

    /// Mean attempt duration over the window, zero when empty.
    pub fn average_processing_time(&self) -> Duration {
        if self.attempts.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.attempts.iter().map(|a| a.duration).sum();
        total / self.attempts.len() as u32
    }

    /// Percentage of windowed attempts that detected a plate.
    pub fn hit_rate(&self) -> f32 {
        if self.attempts.is_empty() {
            return 0.0;
        }
        let hits = self.attempts.iter().filter(|a| a.hit).count();
        hits as f32 / self.attempts.len() as f32 * 100.0
    }

    pub fn sample_count(&self) -> usize {
        self.attempts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_reports_zero() {
        let tracker = PerformanceTracker::new();
        assert_eq!(tracker.average_processing_time(), Duration::ZERO);
        assert_eq!(tracker.hit_rate(), 0.0);
    }

    #[test]
    fn averages_over_recorded_attempts() {
        let mut tracker = PerformanceTracker::new();
        tracker.record(Duration::from_millis(10), true);
        tracker.record(Duration::from_millis(30), false);

        assert_eq!(tracker.average_processing_time(), Duration::from_millis(20));
        assert_eq!(tracker.hit_rate(), 50.0);
    }

    #[test]
    fn window_keeps_only_recent_attempts() {
        let mut tracker = PerformanceTracker::new();
        // 15 misses, then 10 hits; only the hits remain in the window.
        for _ in 0..15 {
            tracker.record(Duration::from_millis(5), false);
        }
        for _ in 0..10 {
            tracker.record(Duration::from_millis(5), true);
        }
        assert_eq!(tracker.sample_count(), 10);
        assert_eq!(tracker.hit_rate(), 100.0);
    }
}
