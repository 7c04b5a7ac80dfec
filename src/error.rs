//! Error types for the row cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Load Error Enum ==
/// Per-location failures surfaced to the pipeline.
///
/// Cache-internal problems (undecodable entries, key-value store outages)
/// are absorbed by the cache layer and never appear here. Only the two
/// conditions below reach the caller, each scoped to a single log
/// location so that one unreachable file does not fail a whole batch.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Metadata lookup failed for a location
    #[error("failed to resolve metadata for '{location}': {source}")]
    MetadataResolution {
        /// The log location whose metadata could not be resolved
        location: String,
        /// Underlying failure reported by the metadata source
        #[source]
        source: anyhow::Error,
    },

    /// Row extraction failed for a location
    #[error("failed to extract rows from '{location}': {source}")]
    Extraction {
        /// The log location that could not be read
        location: String,
        /// Underlying failure reported by the extractor
        #[source]
        source: anyhow::Error,
    },
}

impl LoadError {
    /// Returns the log location this failure is scoped to.
    pub fn location(&self) -> &str {
        match self {
            LoadError::MetadataResolution { location, .. } => location,
            LoadError::Extraction { location, .. } => location,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the row cache.
pub type Result<T> = std::result::Result<T, LoadError>;
