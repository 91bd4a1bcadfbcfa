//! # media-dl
//!
//! Backend library for a self-hosted "submit a URL, poll, fetch the file"
//! media download service.
//!
//! ## Design Philosophy
//!
//! media-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Delegating** - Media extraction and transcoding are done by external
//!   tools (yt-dlp, ffmpeg); this crate owns the job lifecycle only
//!
//! The core is an asynchronous job lifecycle manager: each submitted URL
//! becomes a background job that fetches (and optionally transcodes) the
//! media into a shared storage directory, persisting a pollable status
//! record along the way. Completed artifacts are delivered exactly once and
//! deleted; anything left behind is reclaimed by a time-based janitor sweep.
//!
//! ## Quick Start
//!
//! ```no_run
//! use media_dl::{Config, JobRunner, StatusStore, StorageArea};
//! use media_dl::extractor::CliExtractor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::default());
//!     let storage = Arc::new(StorageArea::new(&config.storage.dir).await?);
//!     let store = Arc::new(StatusStore::new(storage.clone()));
//!     let extractor = CliExtractor::from_config(&config)
//!         .ok_or("yt-dlp binary not found")?;
//!
//!     let runner = JobRunner::new(storage, store, Arc::new(extractor), config.clone());
//!     media_dl::api::start_api_server(runner, config).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// External media extraction and transcoding collaborators
pub mod extractor;
/// Time-based reclamation of stale storage files
pub mod janitor;
/// Background job execution
pub mod job;
/// Shared storage directory handling
pub mod storage;
/// Status record persistence
pub mod store;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{ApiConfig, Config, ExtractionConfig, StorageConfig};
pub use error::{ApiError, Error, ErrorDetail, JobError, Result, ToHttpStatus};
pub use extractor::{CliExtractor, ExtractionRequest, MediaExtractor, NoOpExtractor};
pub use job::JobRunner;
pub use storage::StorageArea;
pub use store::{StatusRecord, StatusStore};
pub use types::{JobId, JobState, MediaFormat};

/// Wait for a termination signal (SIGTERM/SIGINT on unix, Ctrl+C elsewhere).
///
/// Used by [`api::start_api_server`] for graceful shutdown; exposed so
/// embedders driving their own server loop can reuse it.
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments; ctrl_c still
    // covers SIGINT there
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM signal"),
                _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT signal (Ctrl+C)"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C only");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

/// Wait for a termination signal (Ctrl+C on non-unix platforms).
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
