//! Background job execution
//!
//! Each submitted URL becomes one spawned task that runs the whole pipeline
//! for its job: persist a `downloading` record, check environment
//! preconditions, drive the external extractor, finalize the output under
//! the canonical artifact name, and persist the terminal record. The task is
//! fire-and-forget; nothing awaits it and every failure ends as an `error`
//! status record rather than a propagated panic or error.

use crate::config::Config;
use crate::error::JobError;
use crate::extractor::{self, ExtractionRequest, MediaExtractor, DEFAULT_TRANSCODER_BIN};
use crate::storage::StorageArea;
use crate::store::{StatusRecord, StatusStore};
use crate::types::{JobId, MediaFormat};
use crate::utils::format_size;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Spawns and runs background download jobs
///
/// Clone is cheap; clones share the storage area, the status store, the
/// extractor, and the configuration.
#[derive(Clone)]
pub struct JobRunner {
    storage: Arc<StorageArea>,
    store: Arc<StatusStore>,
    extractor: Arc<dyn MediaExtractor>,
    config: Arc<Config>,
}

impl JobRunner {
    /// Create a runner over the shared storage, store, and extractor
    pub fn new(
        storage: Arc<StorageArea>,
        store: Arc<StatusStore>,
        extractor: Arc<dyn MediaExtractor>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            storage,
            store,
            extractor,
            config,
        }
    }

    /// The shared storage area
    pub fn storage(&self) -> &Arc<StorageArea> {
        &self.storage
    }

    /// The shared status store
    pub fn store(&self) -> &Arc<StatusStore> {
        &self.store
    }

    /// The runner's configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Start a job in the background and return immediately
    ///
    /// The returned handle is for tests and embedders that want to await
    /// completion; the API layer drops it. The job's outcome is observable
    /// only through the status store.
    pub fn start(&self, id: JobId, url: String, format: MediaFormat) -> JoinHandle<()> {
        let runner = self.clone();
        tokio::spawn(async move {
            info!(job_id = %id, %url, ?format, "job started");
            match runner.run(&id, &url, format).await {
                Ok(record) => {
                    if let Err(e) = runner.store.write(&id, &record).await {
                        error!(job_id = %id, error = %e, "failed to persist terminal status record");
                    }
                }
                Err(e) => {
                    warn!(job_id = %id, error = %e, "job failed");
                    let record = StatusRecord::error(e.to_string());
                    if let Err(e) = runner.store.write(&id, &record).await {
                        error!(job_id = %id, error = %e, "failed to persist error status record");
                    }
                }
            }
            // Leftover partials are swept regardless of outcome
            runner.storage.remove_temp_files(&id).await;
        })
    }

    /// Run the pipeline for one job, returning its terminal success record
    async fn run(&self, id: &JobId, url: &str, format: MediaFormat) -> crate::Result<StatusRecord> {
        self.store.write(id, &StatusRecord::downloading()).await?;

        // Audio needs the transcoder for its post-step; fail fast before
        // any network work when the binary is absent
        if format.requires_transcoder() && extractor::find_transcoder(&self.config).is_none() {
            return Err(JobError::TranscoderMissing {
                binary: DEFAULT_TRANSCODER_BIN.to_string(),
            }
            .into());
        }

        let request = ExtractionRequest {
            url: url.to_string(),
            format,
            output_base: self.storage.temp_output_path(id),
            proxy: self.config.extraction.proxy.clone(),
        };
        self.extractor.extract(&request).await?;

        let outputs = self.storage.find_by_temp_base(id).await?;
        let Some(produced) = outputs.first() else {
            return Err(JobError::OutputMissing {
                temp_base: StorageArea::temp_base(id),
            }
            .into());
        };
        if outputs.len() > 1 {
            warn!(job_id = %id, count = outputs.len(), "multiple extractor outputs, keeping most recent");
        }

        let artifact = self.storage.artifact_path(id, format);
        tokio::fs::rename(produced, &artifact).await?;

        let size = tokio::fs::metadata(&artifact).await?.len();
        let filename = StorageArea::artifact_name(id, format);
        info!(job_id = %id, %filename, size, "job complete");
        Ok(StatusRecord::complete(filename, format_size(size)))
    }
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("storage", &self.storage.root())
            .field("extractor", &self.extractor.name())
            .finish_non_exhaustive()
    }
}
