//! Row Cache Module
//!
//! The etag-gated get/put wrapper around the key-value store.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats};
use crate::kv::KvStore;
use crate::source::Row;

// == Row Cache ==
/// Read-through cache for decoded log rows, validated by etag.
///
/// Each log file's rows are stored under the file's location string,
/// together with the etag the file had when the rows were extracted. A
/// lookup only returns rows while the store still reports the same etag;
/// everything else is a miss. The cache never fails a caller: the rows
/// returned to the pipeline are identical whether the cache is fully
/// functional or entirely broken.
pub struct RowCache {
    /// Backing key-value store
    store: Arc<dyn KvStore>,
    /// Behavior counters
    stats: Mutex<CacheStats>,
}

impl RowCache {
    // == Constructor ==
    /// Creates a row cache over the given key-value store.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    // == Lookup ==
    /// Returns the cached rows for `location` if they are still fresh.
    ///
    /// A miss is returned when the key is absent, the stored entry does
    /// not decode, the etags differ, or either etag is absent. Key-value
    /// store failures are also misses. Read-only: never writes or
    /// deletes.
    ///
    /// # Arguments
    /// * `location` - The log location the rows were extracted from
    /// * `current_etag` - The etag the location has right now
    pub fn lookup(&self, location: &str, current_etag: Option<&str>) -> Option<Vec<Row>> {
        let bytes = match self.store.get(location.as_bytes()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("cache miss for {}: no entry", location);
                self.stats.lock().record_miss();
                return None;
            }
            Err(error) => {
                warn!("cache miss for {}: key-value store failed: {}", location, error);
                let mut stats = self.stats.lock();
                stats.record_store_failure();
                stats.record_miss();
                return None;
            }
        };

        let entry = match CacheEntry::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(error) => {
                // Left in place; the next successful store overwrites it.
                debug!("cache miss for {}: undecodable entry: {}", location, error);
                let mut stats = self.stats.lock();
                stats.record_corrupt_entry();
                stats.record_miss();
                return None;
            }
        };

        if entry.is_fresh(current_etag) {
            debug!("cache hit for {}", location);
            self.stats.lock().record_hit();
            Some(entry.records)
        } else {
            debug!(
                "cache miss for {}: etag {:?} does not match current {:?}",
                location, entry.etag, current_etag
            );
            self.stats.lock().record_miss();
            None
        }
    }

    // == Store ==
    /// Caches `rows` for `location` under the given etag.
    ///
    /// Unconditionally overwrites any prior entry. Storing an absent etag
    /// is allowed; such an entry can never satisfy a lookup until an
    /// entry with a real etag overwrites it. Store failures are absorbed
    /// as a no-op.
    pub fn store(&self, location: &str, etag: Option<&str>, rows: &[Row]) {
        let entry = CacheEntry::new(etag.map(str::to_owned), rows.to_vec());
        let bytes = match entry.to_bytes() {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!("skipping cache store for {}: entry failed to encode: {}", location, error);
                self.stats.lock().record_store_failure();
                return;
            }
        };

        match self.store.put(location.as_bytes(), &bytes) {
            Ok(()) => {
                debug!("cached {} rows ({} bytes) for {}", rows.len(), bytes.len(), location);
                self.stats.lock().record_store();
            }
            Err(error) => {
                warn!("cache store failed for {}, continuing uncached: {}", location, error);
                self.stats.lock().record_store_failure();
            }
        }
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}
