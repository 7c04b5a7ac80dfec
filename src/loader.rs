//! Row Loader Module
//!
//! Orchestrates freshness resolution, the row cache, and the extractor
//! to turn an ordered list of log locations into one ordered row set.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::cache::{CacheStats, RowCache};
use crate::config::Config;
use crate::error::{LoadError, Result};
use crate::kv::{KvStore, MemoryKvStore, SqliteKvStore};
use crate::resolve::{resolve_logs, ResolvedLog};
use crate::source::{MetadataSource, RemoteStoragePolicy, Row, RowExtractor, StoragePolicy};

// == Load Report ==
/// Result of loading a batch of log locations.
///
/// Successful locations contribute their rows, concatenated in input
/// order. Failed locations contribute one error each; a single
/// unreachable file never fails the batch.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Rows from every successful location, in input order
    pub rows: Vec<Row>,
    /// Per-location failures
    pub failures: Vec<LoadError>,
}

impl LoadReport {
    /// Returns true if every location loaded successfully.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

// == Log Row Loader ==
/// Read-through loader for decoded log rows.
///
/// Remote locations go through the etag-gated cache; local locations are
/// always extracted directly. Cache problems never change the rows the
/// caller receives, only how long the load takes.
pub struct LogRowLoader {
    metadata: Arc<dyn MetadataSource>,
    extractor: Arc<dyn RowExtractor>,
    policy: Arc<dyn StoragePolicy>,
    cache: Arc<RowCache>,
    max_in_flight: usize,
}

impl LogRowLoader {
    // == Constructors ==
    /// Creates a loader over the given collaborators with default settings.
    pub fn new(
        metadata: Arc<dyn MetadataSource>,
        extractor: Arc<dyn RowExtractor>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self::with_config(&Config::default(), metadata, extractor, store)
    }

    /// Creates a loader with an explicit configuration.
    pub fn with_config(
        config: &Config,
        metadata: Arc<dyn MetadataSource>,
        extractor: Arc<dyn RowExtractor>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        Self {
            metadata,
            extractor,
            policy: Arc::new(RemoteStoragePolicy),
            cache: Arc::new(RowCache::new(store)),
            max_in_flight: config.max_in_flight.max(1),
        }
    }

    /// Creates a loader whose cache store comes from the configuration:
    /// a SQLite database when `db_path` is set, in-memory otherwise.
    pub fn from_config(
        config: &Config,
        metadata: Arc<dyn MetadataSource>,
        extractor: Arc<dyn RowExtractor>,
    ) -> anyhow::Result<Self> {
        let store: Arc<dyn KvStore> = match &config.db_path {
            Some(path) => Arc::new(SqliteKvStore::open(path)?),
            None => Arc::new(MemoryKvStore::new()),
        };
        Ok(Self::with_config(config, metadata, extractor, store))
    }

    /// Replaces the storage-kind policy.
    pub fn with_policy(mut self, policy: Arc<dyn StoragePolicy>) -> Self {
        self.policy = policy;
        self
    }

    // == Load ==
    /// Loads rows for every location, partial failures included.
    ///
    /// Each location is resolved, then either served from the cache,
    /// freshly extracted and cached (remote), or extracted directly
    /// (local). Locations are processed concurrently up to the
    /// configured bound; results are merged in input order regardless of
    /// completion order.
    pub async fn load(&self, locations: &[String]) -> LoadReport {
        let resolved =
            resolve_logs(Arc::clone(&self.metadata), locations, self.max_in_flight).await;

        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for (index, log) in resolved.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let extractor = Arc::clone(&self.extractor);
            let cache = Arc::clone(&self.cache);
            let cacheable = self.policy.is_cacheable(&log.location);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                let outcome = load_one(log, cacheable, extractor.as_ref(), &cache).await;
                (index, outcome)
            });
        }

        let mut slots: Vec<Option<Result<Vec<Row>>>> = Vec::new();
        slots.resize_with(locations.len(), || None);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(join_error) => error!("row loading task failed: {}", join_error),
            }
        }

        let mut report = LoadReport::default();
        for (index, slot) in slots.into_iter().enumerate() {
            match slot {
                Some(Ok(rows)) => report.rows.extend(rows),
                Some(Err(failure)) => report.failures.push(failure),
                None => report.failures.push(LoadError::Extraction {
                    location: locations[index].clone(),
                    source: anyhow::anyhow!("row loading task panicked"),
                }),
            }
        }
        report
    }

    // == Load All ==
    /// Loads rows for every location, failing on the first per-location error.
    pub async fn load_all(&self, locations: &[String]) -> Result<Vec<Row>> {
        let report = self.load(locations).await;
        match report.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(report.rows),
        }
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Loads one resolved location through the cache when allowed, directly
/// otherwise.
async fn load_one(
    log: ResolvedLog,
    cacheable: bool,
    extractor: &dyn RowExtractor,
    cache: &RowCache,
) -> Result<Vec<Row>> {
    let ResolvedLog { location, etag } = log;
    let (current_etag, resolve_failure) = match etag {
        Ok(etag) => (etag, None),
        Err(failure) => (None, Some(failure)),
    };

    // Local sources bypass the cache entirely
    if !cacheable {
        return extract(extractor, &location, resolve_failure).await;
    }

    if let Some(rows) = cache.lookup(&location, current_etag.as_deref()) {
        return Ok(rows);
    }

    let rows = extract(extractor, &location, resolve_failure).await?;
    cache.store(&location, current_etag.as_deref(), &rows);
    Ok(rows)
}

/// Runs the extractor for a single location.
///
/// When extraction fails after an earlier metadata failure for the same
/// location, the metadata failure is the one surfaced.
async fn extract(
    extractor: &dyn RowExtractor,
    location: &str,
    resolve_failure: Option<LoadError>,
) -> Result<Vec<Row>> {
    match extractor.extract(location).await {
        Ok(rows) => {
            debug!("extracted {} rows from {}", rows.len(), location);
            Ok(rows)
        }
        Err(extract_error) => match resolve_failure {
            Some(failure) => {
                debug!(
                    "extraction failed for unresolved location {}: {}",
                    location, extract_error
                );
                Err(failure)
            }
            None => Err(LoadError::Extraction {
                location: location.to_string(),
                source: extract_error,
            }),
        },
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileStat;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticMetadata {
        etag: Option<String>,
    }

    #[async_trait]
    impl MetadataSource for StaticMetadata {
        async fn stat(&self, location: &str) -> anyhow::Result<FileStat> {
            Ok(FileStat {
                path: location.to_string(),
                etag: self.etag.clone(),
            })
        }
    }

    struct CountingExtractor {
        rows: Vec<Row>,
        calls: AtomicUsize,
    }

    impl CountingExtractor {
        fn new(rows: Vec<Row>) -> Self {
            Self {
                rows,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RowExtractor for CountingExtractor {
        async fn extract(&self, _location: &str) -> anyhow::Result<Vec<Row>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    struct FailingExtractor;

    #[async_trait]
    impl RowExtractor for FailingExtractor {
        async fn extract(&self, location: &str) -> anyhow::Result<Vec<Row>> {
            Err(anyhow::anyhow!("unreadable log file: {}", location))
        }
    }

    fn sample_rows() -> Vec<Row> {
        vec![[("id".to_string(), json!(1))].into_iter().collect()]
    }

    fn loader(
        etag: Option<&str>,
        extractor: Arc<CountingExtractor>,
    ) -> LogRowLoader {
        LogRowLoader::new(
            Arc::new(StaticMetadata {
                etag: etag.map(str::to_string),
            }),
            extractor,
            Arc::new(MemoryKvStore::new()),
        )
    }

    #[tokio::test]
    async fn test_load_returns_extracted_rows() {
        let extractor = Arc::new(CountingExtractor::new(sample_rows()));
        let loader = loader(Some("e1"), extractor.clone());
        let logs = vec!["s3://b/a.json".to_string()];

        let report = loader.load(&logs).await;

        assert!(report.is_complete());
        assert_eq!(report.rows, sample_rows());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let extractor = Arc::new(CountingExtractor::new(sample_rows()));
        let loader = loader(Some("e1"), extractor.clone());
        let logs = vec!["s3://b/a.json".to_string()];

        let first = loader.load(&logs).await;
        let second = loader.load(&logs).await;

        assert_eq!(first.rows, second.rows);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.cache_stats().hits, 1);
    }

    #[tokio::test]
    async fn test_local_locations_bypass_the_cache() {
        let extractor = Arc::new(CountingExtractor::new(sample_rows()));
        let loader = loader(None, extractor.clone());
        let logs = vec!["/local/a.json".to_string()];

        loader.load(&logs).await;
        loader.load(&logs).await;

        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
        let stats = loader.cache_stats();
        assert_eq!(stats.hits + stats.misses + stats.stores, 0);
    }

    #[tokio::test]
    async fn test_load_all_surfaces_extraction_failure() {
        let loader = LogRowLoader::new(
            Arc::new(StaticMetadata {
                etag: Some("e1".to_string()),
            }),
            Arc::new(FailingExtractor),
            Arc::new(MemoryKvStore::new()),
        );
        let logs = vec!["s3://b/a.json".to_string()];

        let result = loader.load_all(&logs).await;

        let failure = result.unwrap_err();
        assert!(matches!(failure, LoadError::Extraction { .. }));
        assert_eq!(failure.location(), "s3://b/a.json");
    }

    #[tokio::test]
    async fn test_from_config_defaults_to_memory_store() {
        let config = Config::default();
        let loader = LogRowLoader::from_config(
            &config,
            Arc::new(StaticMetadata {
                etag: Some("e1".to_string()),
            }),
            Arc::new(CountingExtractor::new(sample_rows())),
        )
        .unwrap();

        let report = loader.load(&["s3://b/a.json".to_string()]).await;
        assert!(report.is_complete());
    }
}
