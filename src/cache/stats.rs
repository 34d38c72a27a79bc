//! Cache Statistics Module
//!
//! Tracks lookup outcomes and expiry sweeps.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that returned the stored payload
    pub hits: u64,
    /// Number of `get` calls that fell back to the default (absent or stale)
    pub misses: u64,
    /// Number of expiry sweeps run, foreground or scheduled
    pub sweeps: u64,
    /// Total items removed by expiry sweeps
    pub expired_removed: u64,
    /// Current number of items in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Sweep ==
    /// Counts one sweep that removed `removed` items.
    pub fn record_sweep(&mut self, removed: usize) {
        self.sweeps += 1;
        self.expired_removed += removed as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_sweep() {
        let mut stats = CacheStats::new();
        stats.record_sweep(3);
        stats.record_sweep(0);
        assert_eq!(stats.sweeps, 2);
        assert_eq!(stats.expired_removed, 3);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.set_total_entries(4);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["total_entries"], 4);
        assert_eq!(json["hits"], 0);
    }
}
