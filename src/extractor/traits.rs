//! Trait and types for media extraction

use crate::types::MediaFormat;
use async_trait::async_trait;
use std::path::PathBuf;

/// One extraction request handed to the collaborator
///
/// The core never interprets the collaborator's internal options beyond
/// what is captured here: which quality stream to pick, the target
/// container, a stable job-scoped output base name, and network egress.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Source locator, passed through verbatim (never parsed by the core)
    pub url: String,
    /// Target media kind; audio adds the transcoding post-step
    pub format: MediaFormat,
    /// Output path base inside the storage area; the collaborator appends
    /// its own codec-specific extension
    pub output_base: PathBuf,
    /// Optional egress proxy URL
    pub proxy: Option<String>,
}

/// Trait for the external media extraction collaborator
///
/// Implementations fetch the media behind `request.url` and leave one or
/// more files on disk under `request.output_base`. A failure must come back
/// as a distinguishable extraction error so the executor can record the
/// upstream message on the job.
///
/// # Examples
///
/// ```no_run
/// use media_dl::extractor::{CliExtractor, ExtractionRequest, MediaExtractor};
/// use media_dl::types::MediaFormat;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = CliExtractor::from_path().expect("yt-dlp not found");
/// extractor
///     .extract(&ExtractionRequest {
///         url: "https://example.com/watch?v=x".to_string(),
///         format: MediaFormat::Audio,
///         output_base: PathBuf::from("/tmp/downloads/abc123_src"),
///         proxy: None,
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Fetch and convert the media, writing output under the request's base
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::JobError::Extraction`] (wrapped in
    /// [`crate::error::Error::Job`]) when the collaborator reports a
    /// failure, or [`crate::error::Error::ExternalTool`] when the
    /// collaborator could not be executed at all.
    async fn extract(&self, request: &ExtractionRequest) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
