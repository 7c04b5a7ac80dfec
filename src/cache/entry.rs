//! Cache Entry Module
//!
//! Defines the persisted cache value and its wire codec.

use serde::{Deserialize, Serialize};

use crate::source::Row;

// == Cache Entry ==
/// The persisted value for one log file: its decoded rows plus the etag
/// the file had when the rows were extracted.
///
/// Wire format is a JSON object with two top-level fields,
/// `{"etag": string | null, "records": [...]}`, where `records` mirrors
/// row order exactly. Unknown fields fail to decode, and the cache treats
/// any decode failure as a corrupt entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheEntry {
    /// Content fingerprint of the source file at extraction time
    pub etag: Option<String>,
    /// Decoded rows, in extraction order
    pub records: Vec<Row>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry from an etag and a set of decoded rows.
    pub fn new(etag: Option<String>, records: Vec<Row>) -> Self {
        Self { etag, records }
    }

    // == Encode ==
    /// Serializes the entry to its persisted JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    // == Decode ==
    /// Deserializes an entry from persisted bytes.
    ///
    /// Fails on anything that is not a valid `{etag, records}` encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    // == Freshness Check ==
    /// Returns true if the stored etag matches `current`.
    ///
    /// Both etags must be present to match: an absent etag on either side
    /// never matches, including absent-absent.
    pub fn is_fresh(&self, current: Option<&str>) -> bool {
        match (self.etag.as_deref(), current) {
            (Some(stored), Some(current)) => stored == current,
            _ => false,
        }
    }
}
