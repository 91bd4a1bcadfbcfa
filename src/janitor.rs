//! Opportunistic age-based cleanup of the storage area
//!
//! There is no background ticker. A sweep runs piggybacked on selected API
//! requests, deleting any top-level file whose modification time is older
//! than the retention window. Status records age out the same way as media
//! files, which is what bounds status retention for abandoned jobs.

use crate::storage::StorageArea;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Delete every top-level file older than `max_age`, by modification time
///
/// Per-file problems are logged and skipped; the sweep itself never fails,
/// so a broken storage entry cannot take down the request that triggered
/// the cleanup. Returns the number of files removed.
pub async fn sweep(storage: &StorageArea, max_age: Duration) -> usize {
    let now = SystemTime::now();

    let mut entries = match tokio::fs::read_dir(storage.root()).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %storage.root().display(), error = %e, "cleanup sweep could not read storage dir");
            return 0;
        }
    };

    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "cleanup sweep could not advance directory iterator");
                break;
            }
        };

        let metadata = match entry.metadata().await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "cleanup sweep skipping unreadable entry");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let Ok(modified) = metadata.modified() else {
            continue;
        };
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age <= max_age {
            continue;
        }

        match tokio::fs::remove_file(entry.path()).await {
            Ok(()) => {
                debug!(path = ?entry.path(), age_secs = age.as_secs(), "cleanup removed expired file");
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = ?entry.path(), error = %e, "cleanup failed to remove expired file");
            }
        }
    }

    if removed > 0 {
        debug!(removed, "cleanup sweep finished");
    }
    removed
}
