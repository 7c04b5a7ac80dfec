//! Collaborator seams for the row cache
//!
//! The cache sits between a dataframe pipeline and external storage. The
//! traits here are implemented by the embedding application: metadata
//! lookup, row extraction, and the storage-kind split that decides which
//! locations go through the cache at all.

use async_trait::async_trait;
use serde_json::{Map, Value};

// == Row Type ==
/// One decoded record: column name mapped to a scalar value.
///
/// A log file decodes to an ordered `Vec<Row>`, which is the unit of
/// caching (never partially cached).
pub type Row = Map<String, Value>;

// == File Stat ==
/// Metadata snapshot for a single log location.
#[derive(Debug, Clone)]
pub struct FileStat {
    /// Canonical path for the file
    pub path: String,
    /// Content fingerprint reported by the store, if it has one
    pub etag: Option<String>,
}

// == Metadata Source ==
/// Per-location metadata lookup against the backing filesystem or object store.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Resolves one location to its canonical path and current etag.
    ///
    /// Remote object stores report an etag; local filesystems typically
    /// return `None`. A failure is scoped to the queried location.
    async fn stat(&self, location: &str) -> anyhow::Result<FileStat>;
}

// == Row Extractor ==
/// Decodes one log file into its output rows.
#[async_trait]
pub trait RowExtractor: Send + Sync {
    /// Reads and decodes a single log file.
    async fn extract(&self, location: &str) -> anyhow::Result<Vec<Row>>;
}

// == Storage Policy ==
/// Classifies log locations as cacheable (remote) or not (local).
pub trait StoragePolicy: Send + Sync {
    /// Returns true if rows from this location should go through the cache.
    fn is_cacheable(&self, location: &str) -> bool;
}

/// Default policy: remote URIs are cacheable, local paths are not.
///
/// A location counts as remote when it carries a URL scheme other than
/// `file`.
#[derive(Debug, Clone, Default)]
pub struct RemoteStoragePolicy;

impl StoragePolicy for RemoteStoragePolicy {
    fn is_cacheable(&self, location: &str) -> bool {
        match location.split_once("://") {
            Some((scheme, _)) => {
                !scheme.is_empty() && !scheme.eq_ignore_ascii_case("file")
            }
            None => false,
        }
    }
}
