//! Rowcache - an etag-gated read-through cache for log-file rows
//!
//! Sits between a dataframe-construction pipeline and a remote object
//! store. Rows decoded from each remote log file are cached under the
//! file's location and reused only while the store still reports the
//! same etag; local files bypass the cache. Cache problems never fail a
//! load: a corrupt entry or an unreachable store only costs a cache
//! miss.

pub mod cache;
pub mod config;
pub mod error;
pub mod kv;
pub mod loader;
pub mod resolve;
pub mod source;

pub use cache::{CacheEntry, CacheStats, RowCache};
pub use config::Config;
pub use error::{LoadError, Result};
pub use kv::{KvStore, MemoryKvStore, SqliteKvStore};
pub use loader::{LoadReport, LogRowLoader};
pub use resolve::{resolve_logs, ResolvedLog};
pub use source::{
    FileStat, MetadataSource, RemoteStoragePolicy, Row, RowExtractor, StoragePolicy,
};
