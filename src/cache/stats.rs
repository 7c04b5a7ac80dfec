//! Cache Statistics Module
//!
//! Tracks row cache behavior: hits, misses, and absorbed failures.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how the row cache has behaved so far.
///
/// Corrupt entries and key-value store failures are absorbed by the
/// cache (the caller just sees a miss), so they are only observable
/// through these counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned cached rows
    pub hits: u64,
    /// Lookups that returned nothing (absent, stale, corrupt, or store down)
    pub misses: u64,
    /// Successful cache writes
    pub stores: u64,
    /// Entries that failed to decode during lookup
    pub corrupt_entries: u64,
    /// Key-value store failures absorbed during lookup or store
    pub store_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
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

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the successful-write counter.
    pub fn record_store(&mut self) {
        self.stores += 1;
    }

    /// Increments the undecodable-entry counter.
    pub fn record_corrupt_entry(&mut self) {
        self.corrupt_entries += 1;
    }

    /// Increments the absorbed store-failure counter.
    pub fn record_store_failure(&mut self) {
        self.store_failures += 1;
    }
}
