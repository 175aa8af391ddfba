//! Cache effectiveness counters.

use std::collections::VecDeque;
use std::time::Duration;

/// Batch timings kept for the rolling average
const TIMING_WINDOW: usize = 30;

/// Counters exposed for tuning and for tests asserting cache behaviour
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Positions computed by the wave source
    pub total_calculations: u64,
    /// Lookups served from the cache
    pub cache_hits: u64,
    /// Lookups that had to be computed
    pub cache_misses: u64,
    /// Calls into the wave source's batch function
    pub batch_calls: u64,
    /// Entries currently dirty
    pub dirty_count: usize,
    batch_times_ms: VecDeque<f32>,
}

impl CacheStats {
    /// Hit rate over all lookups, in percent
    pub fn hit_rate_percent(&self) -> f32 {
        let lookups = self.cache_hits + self.cache_misses;
        if lookups == 0 {
            0.0
        } else {
            self.cache_hits as f32 * 100.0 / lookups as f32
        }
    }

    /// Mean of the last few batch durations (ms)
    pub fn average_batch_time_ms(&self) -> f32 {
        if self.batch_times_ms.is_empty() {
            0.0
        } else {
            self.batch_times_ms.iter().sum::<f32>() / self.batch_times_ms.len() as f32
        }
    }

    pub(crate) fn record_batch(&mut self, computed: usize, elapsed: Duration) {
        self.batch_calls += 1;
        self.total_calculations += computed as u64;
        if self.batch_times_ms.len() == TIMING_WINDOW {
            self.batch_times_ms.pop_front();
        }
        self.batch_times_ms.push_back(elapsed.as_secs_f32() * 1000.0);
    }

    /// Zero the counters, keeping `dirty_count` which mirrors live state
    pub fn reset(&mut self) {
        *self = Self {
            dirty_count: self.dirty_count,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::default();
        assert_eq!(stats.hit_rate_percent(), 0.0);
        stats.cache_hits = 3;
        stats.cache_misses = 1;
        assert!((stats.hit_rate_percent() - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_rolling_average_window() {
        let mut stats = CacheStats::default();
        for _ in 0..TIMING_WINDOW {
            stats.record_batch(1, Duration::from_millis(10));
        }
        stats.record_batch(1, Duration::from_millis(40));
        // Oldest 10ms sample evicted
        let expected = (10.0 * (TIMING_WINDOW - 1) as f32 + 40.0) / TIMING_WINDOW as f32;
        assert!((stats.average_batch_time_ms() - expected).abs() < 1e-3);
        assert_eq!(stats.batch_calls, TIMING_WINDOW as u64 + 1);
        assert_eq!(stats.total_calculations, TIMING_WINDOW as u64 + 1);
    }

    #[test]
    fn test_reset_keeps_dirty_count() {
        let mut stats = CacheStats {
            cache_hits: 5,
            dirty_count: 7,
            ..Default::default()
        };
        stats.reset();
        assert_eq!(stats.cache_hits, 0);
        assert_eq!(stats.dirty_count, 7);
    }
}
