//! Freshness Resolution Module
//!
//! Resolves log locations to their canonical paths and current etags.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::LoadError;
use crate::source::MetadataSource;

// == Resolved Log ==
/// Snapshot of one location's freshness at resolution time.
///
/// Never persisted: the etag is only meaningful for the load it was
/// resolved for.
#[derive(Debug)]
pub struct ResolvedLog {
    /// Canonical path for the log file (the input location when resolution failed)
    pub location: String,
    /// Current etag, or the per-location resolution failure
    pub etag: Result<Option<String>, LoadError>,
}

// == Resolve Logs ==
/// Resolves each location to its canonical path and current etag.
///
/// Output order matches input order. Metadata failures are captured per
/// location rather than failing the batch; a failed location keeps its
/// input string as the path and carries the failure in `etag`. Lookups
/// run concurrently, bounded by `max_in_flight`.
pub async fn resolve_logs(
    source: Arc<dyn MetadataSource>,
    locations: &[String],
    max_in_flight: usize,
) -> Vec<ResolvedLog> {
    let semaphore = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();

    for (index, location) in locations.iter().enumerate() {
        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let location = location.clone();

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let resolved = match source.stat(&location).await {
                Ok(stat) => {
                    debug!("resolved {} -> {} (etag {:?})", location, stat.path, stat.etag);
                    ResolvedLog {
                        location: stat.path,
                        etag: Ok(stat.etag),
                    }
                }
                Err(source_error) => {
                    debug!("metadata resolution failed for {}: {}", location, source_error);
                    let failure = LoadError::MetadataResolution {
                        location: location.clone(),
                        source: source_error,
                    };
                    ResolvedLog {
                        location,
                        etag: Err(failure),
                    }
                }
            };
            (index, resolved)
        });
    }

    let mut slots: Vec<Option<ResolvedLog>> = Vec::new();
    slots.resize_with(locations.len(), || None);

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, resolved)) => slots[index] = Some(resolved),
            Err(join_error) => error!("metadata resolution task failed: {}", join_error),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| ResolvedLog {
                location: locations[index].clone(),
                etag: Err(LoadError::MetadataResolution {
                    location: locations[index].clone(),
                    source: anyhow::anyhow!("metadata resolution task panicked"),
                }),
            })
        })
        .collect()
}
