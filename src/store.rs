//! Status record persistence
//!
//! One structured record per job id, stored as a JSON file inside the
//! storage area. A write replaces the whole record atomically (write to a
//! temp file, then rename over the final name), and every read and write
//! additionally serializes through one mutex so a poller can never observe
//! a half-written record. Operations are small and infrequent, so the
//! global guard costs little.

use crate::error::Result;
use crate::storage::StorageArea;
use crate::types::{JobId, JobState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use utoipa::ToSchema;

/// The persisted, pollable state of one job
///
/// Only `downloading`, `complete`, and `error` are ever written; `pending`
/// exists solely as the API's reading of an absent record. The constructors
/// keep the field invariants: `filename`/`size` accompany `complete`,
/// `message` accompanies `error`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusRecord {
    /// Current lifecycle state
    pub state: JobState,

    /// Human-readable failure detail, set on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Final artifact name, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Human-readable artifact size, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// When the record was first written
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl StatusRecord {
    /// Record for a job whose worker has started
    pub fn downloading() -> Self {
        let now = Utc::now();
        Self {
            state: JobState::Downloading,
            message: None,
            filename: None,
            size: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Terminal record for a successfully finalized job
    pub fn complete(filename: impl Into<String>, size: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            state: JobState::Complete,
            message: None,
            filename: Some(filename.into()),
            size: Some(size.into()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Terminal record for a failed job
    pub fn error(message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            state: JobState::Error,
            message: Some(message.into()),
            filename: None,
            size: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Persistent store of status records, one per job id
///
/// Clone is cheap; clones share the storage area and the serializing guard.
#[derive(Clone)]
pub struct StatusStore {
    storage: Arc<StorageArea>,
    // Single guard over all record I/O across all jobs; see module docs
    guard: Arc<Mutex<()>>,
}

impl StatusStore {
    /// Create a store backed by the given storage area
    pub fn new(storage: Arc<StorageArea>) -> Self {
        Self {
            storage,
            guard: Arc::new(Mutex::new(())),
        }
    }

    fn record_path(&self, id: &JobId) -> PathBuf {
        self.storage.resolve(&format!("{}.status.json", id))
    }

    /// Replace the record for a job
    ///
    /// Readers either see the previous record or the new one, never a mix:
    /// the JSON is written to a sibling temp file and renamed into place
    /// while the guard is held.
    pub async fn write(&self, id: &JobId, record: &StatusRecord) -> Result<()> {
        let path = self.record_path(id);
        let tmp = path.with_extension("json.tmp");
        let payload = serde_json::to_vec_pretty(record)?;

        let _lock = self.guard.lock().await;
        fs::write(&tmp, &payload).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Read the full record for a job, or None if no record exists yet
    pub async fn read(&self, id: &JobId) -> Result<Option<StatusRecord>> {
        let path = self.record_path(id);

        let _lock = self.guard.lock().await;
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }
}
